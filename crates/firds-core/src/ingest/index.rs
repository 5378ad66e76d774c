use super::parser::{attribute, has_local_name, ElementStream, ParseResult, XmlEvent};

/// Element that wraps one result in the index document
const ENTRY_ELEMENT: &str = "doc";
/// Attribute that carries a field's name on each child of an entry
const FIELD_NAME_ATTRIBUTE: &str = "name";

/// One result of the registry index.
///
/// Built from the named child fields of a `<doc>` element. When a field name
/// repeats within an entry, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    fields: Vec<(String, String)>,
}

impl IndexEntry {
    #[must_use]
    pub(crate) fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn file_type(&self) -> Option<&str> {
        self.get("file_type")
    }

    /// Download link, treating an empty value as absent
    pub fn download_link(&self) -> Option<&str> {
        self.get("download_link").filter(|link| !link.is_empty())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.get("file_name")
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.get("publication_date")
    }
}

/// Parse every entry of an index document, in document order
pub fn parse_index(document: &[u8]) -> ParseResult<Vec<IndexEntry>> {
    let mut stream = ElementStream::new(document);
    let mut entries = Vec::new();

    let mut entry_depth: Option<usize> = None;
    let mut fields = Vec::new();
    // (name, value, still reading leading text)
    let mut field: Option<(String, String, bool)> = None;

    while let Some(event) = stream.next_event()? {
        match event {
            XmlEvent::Start { element, depth } => match entry_depth {
                None if has_local_name(&element, ENTRY_ELEMENT) => {
                    entry_depth = Some(depth);
                    fields.clear();
                }
                Some(entry) if depth == entry + 1 => {
                    field = attribute(&element, FIELD_NAME_ATTRIBUTE)?
                        .map(|name| (name, String::new(), true));
                }
                Some(_) => {
                    if let Some((_, _, reading)) = field.as_mut() {
                        *reading = false;
                    }
                }
                None => {}
            },
            XmlEvent::Text(text) => {
                if let Some((_, value, true)) = field.as_mut() {
                    value.push_str(&text);
                }
            }
            XmlEvent::End { depth } => match entry_depth {
                Some(entry) if depth == entry + 1 => {
                    if let Some((name, value, _)) = field.take() {
                        fields.push((name, value));
                    }
                }
                Some(entry) if depth == entry => {
                    entries.push(IndexEntry::from_fields(std::mem::take(&mut fields)));
                    entry_depth = None;
                }
                _ => {}
            },
        }
    }

    Ok(entries)
}

/// Entries accepted by `predicate` that also carry a non-empty download
/// link, in document order
pub fn matching_entries<P>(document: &[u8], predicate: P) -> ParseResult<Vec<IndexEntry>>
where
    P: Fn(&IndexEntry) -> bool,
{
    let entries = parse_index(document)?
        .into_iter()
        .filter(|entry| entry.download_link().is_some() && predicate(entry))
        .collect();
    Ok(entries)
}

/// Download links of [`matching_entries`]
pub fn matching_links<P>(document: &[u8], predicate: P) -> ParseResult<Vec<String>>
where
    P: Fn(&IndexEntry) -> bool,
{
    let links = matching_entries(document, predicate)?
        .iter()
        .filter_map(|entry| entry.download_link().map(str::to_string))
        .collect();
    Ok(links)
}

/// The `position`-th (zero-based) qualifying link, or `None` when fewer qualify
pub fn select_nth_matching_link<P>(
    document: &[u8],
    predicate: P,
    position: usize,
) -> ParseResult<Option<String>>
where
    P: Fn(&IndexEntry) -> bool,
{
    let entries = matching_entries(document, predicate)?;
    tracing::info!("Found {} qualifying download links", entries.len());

    let Some(entry) = entries.get(position) else {
        tracing::warn!(
            "Fewer than {} qualifying links found ({})",
            position + 1,
            entries.len()
        );
        return Ok(None);
    };
    let link = entry.download_link().map(str::to_string);
    if let Some(link) = &link {
        tracing::info!(
            "Selected link #{}: {} (file {}, published {})",
            position + 1,
            link,
            entry.file_name().unwrap_or("unknown"),
            entry.publication_date().unwrap_or("unknown")
        );
    }
    Ok(link)
}

/// The second qualifying link. Malformed documents are logged and reported
/// as "not found".
pub fn select_second_matching_link<P>(document: &[u8], predicate: P) -> Option<String>
where
    P: Fn(&IndexEntry) -> bool,
{
    match select_nth_matching_link(document, predicate, 1) {
        Ok(link) => link,
        Err(e) => {
            tracing::error!("Error parsing index document: {}", e);
            None
        }
    }
}

/// Entry filter on an exact `file_type` value
#[derive(Debug, Clone)]
pub struct FileTypeFilter {
    file_type: String,
}

impl FileTypeFilter {
    pub fn new(file_type: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
        }
    }

    pub fn matches(&self, entry: &IndexEntry) -> bool {
        entry.file_type() == Some(self.file_type.as_str())
    }
}

/// Picks one download link out of an index document
#[derive(Debug, Clone)]
pub struct LinkSelector {
    filter: FileTypeFilter,
    position: usize,
}

impl LinkSelector {
    pub fn new(file_type: impl Into<String>, position: usize) -> Self {
        Self {
            filter: FileTypeFilter::new(file_type),
            position,
        }
    }

    #[tracing::instrument(name = "index", skip_all)]
    pub fn try_select(&self, document: &[u8]) -> ParseResult<Option<String>> {
        select_nth_matching_link(document, |entry| self.filter.matches(entry), self.position)
    }

    pub fn select(&self, document: &[u8]) -> Option<String> {
        match self.try_select(document) {
            Ok(link) => link,
            Err(e) => {
                tracing::error!("Error parsing index document: {}", e);
                None
            }
        }
    }
}

impl Default for LinkSelector {
    fn default() -> Self {
        Self::new("DLTINS", 1)
    }
}
