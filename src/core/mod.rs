/// Student and teacher accounts: registration, login, lookup
pub mod accounts;

/// Tuition and book-fee calculation
pub mod fees;

/// Account code and password generation
pub mod identity;

/// Per-account private sheets
pub mod notes;

/// Tuition and book-fee payments
pub mod payments;

/// Whole-table reads, appends and keyed updates
pub mod records;

/// Table tabs and their header rows
pub mod schema;

/// Subject-to-teacher assignments
pub mod subjects;
