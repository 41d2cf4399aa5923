//! Format detection and raw text extraction for uploaded resumes.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::ingest::IngestError;
use crate::models::DocumentFormat;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Archive member holding the body text of a Word document.
const DOCX_BODY_PART: &str = "word/document.xml";
/// Upper bound on the decompressed body part.
const MAX_DOCX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Decides the format of an upload. Magic bytes win over the extension; a
/// `.pdf` or `.docx` file without the matching header is corrupt, not text.
pub fn detect_format(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<DocumentFormat, IngestError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(DocumentFormat::Pdf);
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let content_type = content_type.map(|c| c.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => Err(IngestError::Parse(
            "file has a .pdf extension but no PDF header".to_string(),
        )),
        Some("docx") => docx_if_archive(
            bytes,
            "file has a .docx extension but is not a DOCX archive",
        ),
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => Ok(DocumentFormat::Text),
        Some(ext) => Err(IngestError::UnsupportedFormat(format!(".{ext}"))),
        None => match content_type.as_deref() {
            Some("application/pdf") => Err(IngestError::Parse(
                "content type is application/pdf but no PDF header was found".to_string(),
            )),
            Some(DOCX_CONTENT_TYPE) => {
                docx_if_archive(bytes, "content type is DOCX but the file is not a DOCX archive")
            }
            Some(ct) if ct.starts_with("text/") => Ok(DocumentFormat::Text),
            _ if bytes.starts_with(ZIP_MAGIC) => Ok(DocumentFormat::Docx),
            Some(ct) => Err(IngestError::UnsupportedFormat(ct.to_string())),
            None => Err(IngestError::UnsupportedFormat(
                "no file extension or content type".to_string(),
            )),
        },
    }
}

fn docx_if_archive(bytes: &[u8], mismatch: &str) -> Result<DocumentFormat, IngestError> {
    if bytes.starts_with(ZIP_MAGIC) {
        Ok(DocumentFormat::Docx)
    } else {
        Err(IngestError::Parse(mismatch.to_string()))
    }
}

/// Extracts raw (not yet normalized) text for the detected format.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, IngestError> {
    match format {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Docx => extract_docx(bytes),
        DocumentFormat::Text => extract_plain(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, IngestError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match outcome {
        Ok(Ok(text)) => {
            debug!("Extracted {} chars from PDF", text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(IngestError::Parse(format!("corrupt PDF: {e}"))),
        Err(_) => {
            warn!("PDF extractor panicked on input of {} bytes", bytes.len());
            Err(IngestError::Parse("corrupt PDF: extractor aborted".to_string()))
        }
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Parse(format!("corrupt DOCX: {e}")))?;
    let body = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| IngestError::Parse(format!("corrupt DOCX, missing {DOCX_BODY_PART}: {e}")))?;

    let mut xml = String::new();
    body.take(MAX_DOCX_BODY_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Parse(format!("corrupt DOCX, unreadable {DOCX_BODY_PART}: {e}")))?;

    let text = docx_body_text(&xml)?;
    debug!("Extracted {} chars from DOCX", text.len());
    Ok(text)
}

/// Collects `<w:t>` runs; paragraphs and breaks become newlines, tabs stay tabs.
fn docx_body_text(xml: &str) -> Result<String, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| IngestError::Parse(format!("corrupt DOCX XML: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::Parse(format!(
                    "corrupt DOCX XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            Ok(_) => {}
        }
    }

    Ok(out)
}

fn extract_plain(bytes: &[u8]) -> Result<String, IngestError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| IngestError::Parse(format!("text file is not valid UTF-8: {e}")))
}

/// Minimal DOCX archive whose body part is `document_xml`.
#[cfg(test)]
pub(crate) fn docx_fixture(document_xml: &str) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file(DOCX_BODY_PART, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
