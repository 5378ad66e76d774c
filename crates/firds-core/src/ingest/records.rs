use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;

use super::parser::{has_local_name, ElementStream, ParseResult, XmlEvent};
use crate::error::Result;

/// Element wrapping one instrument in a FIRDS delta file
pub const RECORD_ELEMENT: &str = "FinInstrm";

static NAMESPACE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:([a-zA-Z0-9]+)="([^"]+)""#).expect("namespace pattern is valid")
});

/// The six leaf fields projected out of each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentField {
    Id,
    FullName,
    ClassificationType,
    CommodityDerivativeIndicator,
    NotionalCurrency,
    Issuer,
}

impl InstrumentField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::FullName,
        Self::ClassificationType,
        Self::CommodityDerivativeIndicator,
        Self::NotionalCurrency,
        Self::Issuer,
    ];

    /// XML element name searched for inside a record
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::FullName => "FullNm",
            Self::ClassificationType => "ClssfctnTp",
            Self::CommodityDerivativeIndicator => "CmmdtyDerivInd",
            Self::NotionalCurrency => "NtnlCcy",
            Self::Issuer => "Issr",
        }
    }

    /// Column header in the written table
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "FinInstrmGnlAttrbts.Id",
            Self::FullName => "FinInstrmGnlAttrbts.FullNm",
            Self::ClassificationType => "FinInstrmGnlAttrbts.ClssfctnTp",
            Self::CommodityDerivativeIndicator => "FinInstrmGnlAttrbts.CmmdtyDerivInd",
            Self::NotionalCurrency => "FinInstrmGnlAttrbts.NtnlCcy",
            Self::Issuer => "Issr",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.tag().as_bytes() == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentRecord {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub classification_type: Option<String>,
    pub commodity_derivative_indicator: Option<String>,
    pub notional_currency: Option<String>,
    pub issuer: Option<String>,
}

impl InstrumentRecord {
    pub fn get(&self, field: InstrumentField) -> Option<&str> {
        match field {
            InstrumentField::Id => self.id.as_deref(),
            InstrumentField::FullName => self.full_name.as_deref(),
            InstrumentField::ClassificationType => self.classification_type.as_deref(),
            InstrumentField::CommodityDerivativeIndicator => {
                self.commodity_derivative_indicator.as_deref()
            }
            InstrumentField::NotionalCurrency => self.notional_currency.as_deref(),
            InstrumentField::Issuer => self.issuer.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: InstrumentField) -> &mut Option<String> {
        match field {
            InstrumentField::Id => &mut self.id,
            InstrumentField::FullName => &mut self.full_name,
            InstrumentField::ClassificationType => &mut self.classification_type,
            InstrumentField::CommodityDerivativeIndicator => {
                &mut self.commodity_derivative_indicator
            }
            InstrumentField::NotionalCurrency => &mut self.notional_currency,
            InstrumentField::Issuer => &mut self.issuer,
        }
    }

    /// Cells in column order, absent fields as empty strings
    pub fn to_row(&self) -> [&str; 6] {
        InstrumentField::ALL.map(|field| self.get(field).unwrap_or_default())
    }
}

/// Streams records out of an instrument document in document order.
///
/// Every record element is matched, at any depth and also when nested inside
/// another record. Records are yielded in start-tag order. Within a record,
/// each field takes the leading text of the first element with that tag
/// anywhere in the record's subtree, nested records included.
pub struct RecordReader<'a> {
    stream: ElementStream<'a>,
    record_element: String,
    // Records in start-tag order, from the oldest one not yet yielded
    pending: VecDeque<PendingRecord>,
    finished: bool,
}

#[derive(Debug, Default)]
struct PendingRecord {
    // Depth of the record element while it is still open
    open_at: Option<usize>,
    capturing: Option<InstrumentField>,
    record: InstrumentRecord,
}

impl<'a> RecordReader<'a> {
    pub fn new(document: &'a [u8], record_element: impl Into<String>) -> Self {
        Self {
            stream: ElementStream::new(document),
            record_element: record_element.into(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn open_records(&mut self) -> impl Iterator<Item = &mut PendingRecord> + '_ {
        self.pending.iter_mut().filter(|p| p.open_at.is_some())
    }

    fn apply(&mut self, event: XmlEvent<'_>) {
        match event {
            XmlEvent::Start { element, depth } => {
                let field = InstrumentField::from_tag(element.local_name().as_ref());
                for pending in self.open_records() {
                    pending.capturing = None;
                    if let Some(field) = field {
                        let slot = pending.record.slot_mut(field);
                        if slot.is_none() {
                            *slot = Some(String::new());
                            pending.capturing = Some(field);
                        }
                    }
                }
                if has_local_name(&element, &self.record_element) {
                    self.pending.push_back(PendingRecord {
                        open_at: Some(depth),
                        ..PendingRecord::default()
                    });
                }
            }
            XmlEvent::Text(text) => {
                for pending in self.open_records() {
                    if let Some(field) = pending.capturing {
                        if let Some(value) = pending.record.slot_mut(field) {
                            value.push_str(&text);
                        }
                    }
                }
            }
            XmlEvent::End { depth } => {
                for pending in self.open_records() {
                    pending.capturing = None;
                    if pending.open_at == Some(depth) {
                        pending.open_at = None;
                    }
                }
            }
        }
    }
}

impl Iterator for RecordReader<'_> {
    type Item = ParseResult<InstrumentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending.front().is_some_and(|p| p.open_at.is_none()) {
                return self.pending.pop_front().map(|p| Ok(p.record));
            }
            if self.finished {
                return None;
            }
            match self.stream.next_event() {
                Ok(Some(event)) => self.apply(event),
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.finished = true;
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Collect every record of `document`
pub fn parse_records(document: &[u8]) -> ParseResult<Vec<InstrumentRecord>> {
    RecordReader::new(document, RECORD_ELEMENT).collect()
}

/// Prefixed namespace declarations found in the raw document text
pub fn capture_namespaces(text: &str) -> BTreeMap<String, String> {
    NAMESPACE_DECLARATION
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Table file name for an extracted member: its file name up to the first
/// dot, with a `.csv` extension
pub fn table_file_name(xml_file: &str) -> String {
    let name = Path::new(xml_file)
        .file_name()
        .map_or_else(|| xml_file.to_string(), |n| n.to_string_lossy().into_owned());
    let base = name.split('.').next().unwrap_or_default();
    format!("{base}.csv")
}

/// Output of one extraction run
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub path: PathBuf,
    pub records: usize,
    pub namespaces: BTreeMap<String, String>,
}

/// Projects instrument records from an extracted XML file into a CSV table
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    source_dir: PathBuf,
    output_dir: PathBuf,
    record_element: String,
}

impl RecordExtractor {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            record_element: RECORD_ELEMENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_record_element(mut self, element: impl Into<String>) -> Self {
        self.record_element = element.into();
        self
    }

    pub fn output_path(&self, xml_file: &str) -> PathBuf {
        self.output_dir.join(table_file_name(xml_file))
    }

    /// Write the table for `xml_file` (relative to the source directory).
    ///
    /// The table only appears at its final path once every record has been
    /// written; a parse failure leaves the output directory untouched.
    #[tracing::instrument(name = "records", skip(self))]
    pub fn extract_to_table(&self, xml_file: &str) -> Result<RecordTable> {
        let source = self.source_dir.join(xml_file);
        tracing::info!("Processing XML file: {}", source.display());

        let content = fs::read(&source)?;
        let namespaces = capture_namespaces(&String::from_utf8_lossy(&content));
        tracing::debug!("Namespace declarations: {:?}", namespaces);

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(xml_file);
        let mut tmp = NamedTempFile::new_in(&self.output_dir)?;

        let mut records = 0;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(InstrumentField::ALL.map(InstrumentField::column))?;
            for record in RecordReader::new(&content, self.record_element.as_str()) {
                writer.write_record(record?.to_row())?;
                records += 1;
            }
            writer.flush()?;
        }

        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::info!("Wrote {} record(s) to {}", records, path.display());

        Ok(RecordTable {
            path,
            records,
            namespaces,
        })
    }
}
