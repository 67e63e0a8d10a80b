/// Hands out consecutive numeric identifiers
///
/// Each kind of record owns its own sequence, so ids are predictable and independent of the order
/// in which unrelated records are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    /// The id of the first product loaded into an empty catalog
    pub const FIRST_PRODUCT: u32 = 10_000;
    /// The document number of the first supplier
    pub const FIRST_SUPPLIER: u32 = 10_001;
    /// The number of the first order
    pub const FIRST_ORDER: u32 = 1;

    pub fn starting_at(first: u32) -> Self {
        Self {next: first}
    }

    pub fn products() -> Self {
        Self::starting_at(Self::FIRST_PRODUCT)
    }

    pub fn suppliers() -> Self {
        Self::starting_at(Self::FIRST_SUPPLIER)
    }

    pub fn orders() -> Self {
        Self::starting_at(Self::FIRST_ORDER)
    }

    /// Returns the id the next call to `next_id` will hand out
    pub fn peek(&self) -> u32 {
        self.next
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}
