/// A physical access-control point.
///
/// Referenced by id only, from entries and user allowlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub name: String,
    pub location: String,
}

impl Checkpoint {
    pub fn new(
        checkpoint_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            checkpoint_id: checkpoint_id.into(),
            name: name.into(),
            location: location.into(),
        }
    }
}
