/// Snapshot summary command.
pub mod info;
/// Catalog layout listing command.
pub mod layouts;
/// Indented value tree printer.
pub mod print;
/// Root record visit command.
pub mod walk;

#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod util;
