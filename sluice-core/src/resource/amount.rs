use super::Resource;

/// A quantity of a particular resource, e.g. "consumes 3 Fuel".
///
/// Borrows the resource from its registry; the registry must outlive it.
#[derive(Clone, Copy, Debug)]
pub struct ResourceAmount<'a> {
    pub resource: &'a Resource,
    pub amount: i32,
}

impl<'a> ResourceAmount<'a> {
    #[inline]
    pub fn new(resource: &'a Resource, amount: i32) -> Self {
        Self { resource, amount }
    }
}
