mod archive;
mod derive;
mod index;
mod parser;
mod pipeline;
mod records;

pub use archive::{ArchiveExtractor, ExtractedArchive};
pub use derive::ColumnDeriver;
pub use index::{
    matching_entries, matching_links, parse_index, select_nth_matching_link,
    select_second_matching_link, FileTypeFilter, IndexEntry, LinkSelector,
};
pub use parser::{ParseError, ParseResult};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineResult};
pub use records::{
    capture_namespaces, parse_records, table_file_name, InstrumentField, InstrumentRecord,
    RecordExtractor, RecordReader, RecordTable, RECORD_ELEMENT,
};
