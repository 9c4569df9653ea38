/*!
# Writers module
Contains the logic for writing the output tables and plain-text lists.
*/
/// Writes the formatted GWAS table and the merged GWAS + reference table
pub mod gwas_tables;
/// Writes plain one-identifier-per-line lists
pub mod id_list;
/// Writes the flat variant annotation table
pub mod annotation_table;
/// Writes the annotated reference panel
pub mod reference_panel;
/// Writes per-chromosome region files
pub mod region_lists;
