// Normalization helpers shared by the ledger and any front end that displays it.

/// Replaces an empty sanitized file name.
pub const PLACEHOLDER_NAME: &str = "fichier";

/// Extensions accepted for receipts.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "pdf"];

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Parses an amount typed with French conventions ("50,00 €", "12.5 EUR").
/// Returns `None` for anything that is not a finite number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let mut cleaned: String = text.chars().filter(|c| !c.is_whitespace() && *c != '€').collect();
    // Strip every EUR marker regardless of case
    while let Some(pos) = cleaned.to_ascii_lowercase().find("eur") {
        cleaned.replace_range(pos..pos + 3, "");
    }
    let normalized = cleaned.replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Makes a user supplied name safe to use as a file or folder name.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '-',
            _ => c,
        })
        .collect();
    let cleaned: String = replaced
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        cleaned
    }
}

/// Lower-cased extension of a name or reference, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_accepted_attachment(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
    Other,
}

impl AttachmentKind {
    pub fn of(reference: &str) -> Self {
        match extension_of(reference) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => AttachmentKind::Image,
            Some(ext) if ext == "pdf" => AttachmentKind::Pdf,
            _ => AttachmentKind::Other,
        }
    }

    /// Only images are rendered inline; PDFs are listed but never previewed.
    pub fn is_previewable(self) -> bool {
        self == AttachmentKind::Image
    }
}
