/// A platform group.
///
/// Groups have no references of their own; users join them and projects are
/// attached to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
