/// eng
/// Loading of the parser tables from JSON files:
/// 1) compound dictionary and mixture dictionary
/// 2) ordered replacement tables (object order is kept)
/// 3) string lists: stop words, unknown and error lists
/// A JSON syntax error is reported with the offending line and a pointer to the column
pub mod load_from_file;
/// terminal logger setup
pub mod logger;
