//! Conversion chains against real external tools.
//!
//! Each test probes for the tool it needs and returns early when it is not
//! installed, so the suite passes on machines without the converters.

use documix::convert::docx;
use documix::convert::pdf;
use documix::convert::tools::ToolInventory;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// A deliberately minimal PDF with one page of text. Poppler reconstructs
/// the cross-reference table when it is damaged, so the fixture keeps only
/// the object structure.
fn write_minimal_pdf(path: &Path) {
    let pdf = b"%PDF-1.4\n\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n\
4 0 obj << /Length 46 >> stream\n\
BT /F1 24 Tf 72 720 Td (Hello DocuMix) Tj ET\n\
endstream\nendobj\n\
5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n\
trailer << /Root 1 0 R /Size 6 >>\n\
%%EOF\n";
    std::fs::write(path, pdf).unwrap();
}

/// Minimal OOXML container accepted by both pandoc and docx-lite.
fn write_minimal_docx(path: &Path, text: &str) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::<'_, ()>::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:body>
</w:document>"#
    );
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[tokio::test]
async fn pdftotext_extracts_text() {
    let inventory = ToolInventory::probe().await;
    if !inventory.has("pdftotext") {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    write_minimal_pdf(&path);

    let (text, method) = pdf::convert(&path, 30).await.unwrap();
    assert_eq!(method, "pdftotext");
    assert!(text.contains("Hello DocuMix"));
}

#[tokio::test]
async fn docx_chain_succeeds_with_or_without_pandoc() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    write_minimal_docx(&path, "Quarterly revenue grew nicely.");

    // With pandoc installed the primary attempt wins; without it the
    // docx-lite fallback still produces an ok result.
    let (text, method) = docx::convert(&path, 30).await.unwrap();
    assert!(text.contains("Quarterly revenue grew nicely."));
    assert!(method == "pandoc" || method == "docx-lite");
}

#[tokio::test]
async fn docx_fallback_alone_extracts_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    write_minimal_docx(&path, "Fallback path text.");

    let (text, method) = docx::convert_with_docx_lite(&path).await.unwrap();
    assert_eq!(method, "docx-lite");
    assert!(text.contains("Fallback path text."));
}

#[tokio::test]
async fn full_run_over_pdf_directory() {
    let inventory = ToolInventory::probe().await;
    if !inventory.has("pdftotext") {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    write_minimal_pdf(&dir.path().join("report.pdf"));
    std::fs::write(dir.path().join("malware.pdf.exe"), b"MZ\x90\x00").unwrap();

    let mut config = documix::CompileConfig::new(dir.path());
    config.output = dir.path().join("out.md");
    let compiler = documix::DocumentCompiler::new(config).unwrap();
    let report = compiler.run().await.unwrap();

    assert!(report.document.contains("Hello DocuMix"));
    assert!(report.document.contains("## File: malware.pdf.exe"));
    assert!(report.document.contains("[Skipped: suspicious"));
    assert_eq!(report.summary.flagged, vec!["malware.pdf.exe".to_string()]);
}
