use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::CompressionMethod;

/// In-memory ZIP with the given members; names ending in `/` become directories
pub fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in members {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }
    buf
}

/// Solr-style index document with one `<doc>` per (file_type, link) pair
pub fn index_xml(entries: &[(&str, &str)]) -> Vec<u8> {
    let docs: String = entries
        .iter()
        .map(|(file_type, link)| {
            format!(
                "<doc><str name=\"file_type\">{file_type}</str>\
                 <str name=\"download_link\">{link}</str></doc>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <response><result name=\"response\" numFound=\"{}\" start=\"0\">{docs}</result></response>",
        entries.len()
    )
    .into_bytes()
}
