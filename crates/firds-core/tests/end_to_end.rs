use std::fs;
use std::io::{Cursor, Write};

use firds_core::{Pipeline, PipelineConfig, PipelineError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;

const INSTRUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:auth.036.001.02" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <FinInstrmRptgRefDataDltaRpt>
    <FinInstrm>
      <TermntdRcrd>
        <FinInstrmGnlAttrbts>
          <Id>ABC123</Id>
          <FullNm>Test Instrument</FullNm>
          <ClssfctnTp>XXX</ClssfctnTp>
          <CmmdtyDerivInd>false</CmmdtyDerivInd>
          <NtnlCcy>USD</NtnlCcy>
        </FinInstrmGnlAttrbts>
        <Issr>TestIssuer</Issr>
      </TermntdRcrd>
    </FinInstrm>
  </FinInstrmRptgRefDataDltaRpt>
</Document>"#;

fn zip_with(name: &str, content: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> = FileOptions::default();
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn index_for(server: &MockServer) -> String {
    let base = server.uri();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <result name="response" numFound="3" start="0">
    <doc>
      <str name="file_name">DLTINS_20210117_01of01.zip</str>
      <str name="file_type">DLTINS</str>
      <str name="download_link">{base}/files/DLTINS_20210117_01of01.zip</str>
    </doc>
    <doc>
      <str name="file_name">FULCAN_20210118_01of01.zip</str>
      <str name="file_type">FULCAN</str>
      <str name="download_link">{base}/files/FULCAN_20210118_01of01.zip</str>
    </doc>
    <doc>
      <str name="file_name">DLTINS_20210119_01of02.zip</str>
      <str name="file_type">DLTINS</str>
      <str name="download_link">{base}/files/DLTINS_20210119_01of02.zip</str>
    </doc>
  </result>
</response>"#
    )
}

async fn serve_registry(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/solr/select"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_for(server)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/DLTINS_20210119_01of02.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(zip_with("DLTINS_20210119_01of02.xml", INSTRUMENT)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_registry_to_augmented_table() {
    let server = MockServer::start().await;
    serve_registry(&server).await;
    let tmp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default().rooted_at(tmp.path())).unwrap();

    let output = pipeline
        .run(&format!("{}/solr/select?q=*", server.uri()))
        .await
        .unwrap();

    assert!(output.download_link.ends_with("/files/DLTINS_20210119_01of02.zip"));
    assert_eq!(output.records, 1);
    assert_eq!(
        output.namespaces.get("xsi").map(String::as_str),
        Some("http://www.w3.org/2001/XMLSchema-instance")
    );

    let table = fs::read_to_string(tmp.path().join("output/DLTINS_20210119_01of02.csv")).unwrap();
    assert_eq!(
        table,
        "FinInstrmGnlAttrbts.Id,FinInstrmGnlAttrbts.FullNm,FinInstrmGnlAttrbts.ClssfctnTp,\
         FinInstrmGnlAttrbts.CmmdtyDerivInd,FinInstrmGnlAttrbts.NtnlCcy,Issr,a_count,contains_a\n\
         ABC123,Test Instrument,XXX,false,USD,TestIssuer,1,YES\n"
    );
}

#[tokio::test]
async fn test_registry_error_status_stops_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/select"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default().rooted_at(tmp.path())).unwrap();

    let result = pipeline.run(&format!("{}/solr/select", server.uri())).await;

    assert!(matches!(result, Err(PipelineError::FetchIndex(_))));
    assert_eq!(fs::read_dir(tmp.path().join("output")).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_archive_stops_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/select"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_for(&server)))
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default().rooted_at(tmp.path())).unwrap();

    let result = pipeline.run(&format!("{}/solr/select", server.uri())).await;

    assert!(matches!(result, Err(PipelineError::NoMember(_))));
}
