//! Benchmarks for document read and find/replace.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::{Cursor, Write};
use std::path::Path;
use wordmcp::docx::{editor, reader};
use wordmcp::{DocumentService, PathResolver, StyleMap};

/// Body XML with `paragraph_count` paragraphs, every tenth one a heading.
fn create_document_xml(paragraph_count: usize) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>"#,
    );

    for i in 0..paragraph_count {
        if i % 10 == 0 {
            content.push_str(&format!(
                r#"
    <w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Section {}</w:t></w:r></w:p>"#,
                i / 10
            ));
        } else {
            content.push_str(&format!(
                r#"
    <w:p>
      <w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Item {}: </w:t></w:r>
      <w:r><w:t>the quick brown fox jumps over the lazy dog.</w:t></w:r>
    </w:p>"#,
                i
            ));
        }
    }

    content.push_str(
        r#"
    <w:sectPr/>
  </w:body>
</w:document>"#,
    );
    content
}

/// Minimal package around [`create_document_xml`].
fn write_test_docx(path: &Path, paragraph_count: usize) {
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();

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
        zip.write_all(create_document_xml(paragraph_count).as_bytes())
            .unwrap();

        zip.finish().unwrap();
    }
    std::fs::write(path, buffer).unwrap();
}

/// Benchmark body parsing at various sizes.
fn bench_read_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_body");
    let styles = StyleMap::default();

    for para_count in [10, 100, 1000].iter() {
        let xml = create_document_xml(*para_count);

        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &xml, |b, xml| {
            b.iter(|| {
                let _ = reader::read_body(black_box(xml), &styles);
            });
        });
    }

    group.finish();
}

/// Benchmark find/replace over run text.
fn bench_replace_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_text");

    for para_count in [10, 100, 1000].iter() {
        let xml = create_document_xml(*para_count);

        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &xml, |b, xml| {
            b.iter(|| {
                let _ = editor::replace_text(black_box(xml), "fox", "cat");
            });
        });
    }

    group.finish();
}

/// Benchmark the full read_document path, including ZIP access.
fn bench_read_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_document");
    let dir = tempfile::tempdir().unwrap();
    let service = DocumentService::new(PathResolver::new(dir.path()));

    for para_count in [10, 100, 1000].iter() {
        let name = format!("doc{}.docx", para_count);
        write_test_docx(&dir.path().join(&name), *para_count);

        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &name, |b, name| {
            b.iter(|| {
                let _ = service.read_document(black_box(name));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_body, bench_replace_text, bench_read_document);
criterion_main!(benches);
