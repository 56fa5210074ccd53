//! Benchmarks for response classification and delivery
//!
//! ## Benchmarks Included:
//!
//! 1. **Fault Parsing**: reason extraction from realistic and padded fault bodies
//! 2. **Classification**: status and content-type dispatch for non-200 responses
//! 3. **Envelope Rendering**: WS-Management header construction
//! 4. **Delivery Round Trip**: one POST against a local mock listener

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use tokio::runtime::Runtime;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use winrm_courier::delivery::{Deliverable, DeliveryConfig, DeliveryEngine, Target};
use winrm_courier::envelope::{Envelope, ACTION_GET};
use winrm_courier::fault::{classify, parse_fault};

const FAULT_BODY: &str = r#"<s:Envelope xml:lang="en-US" xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd">
  <s:Header>
    <a:Action>http://schemas.dmtf.org/wbem/wsman/1/wsman/fault</a:Action>
    <a:MessageID>uuid:2C1E8D38-6D80-4F5D-9C5E-6C0B4B1E0F11</a:MessageID>
  </s:Header>
  <s:Body>
    <s:Fault>
      <s:Code><s:Value>s:Sender</s:Value><s:Subcode><s:Value>w:AccessDenied</s:Value></s:Subcode></s:Code>
      <s:Reason><s:Text xml:lang="en-US">Access is denied.</s:Text></s:Reason>
      <s:Detail>
        <f:WSManFault xmlns:f="http://schemas.microsoft.com/wbem/wsman/1/wsmanfault" Code="5" Machine="win01">
          <f:Message>Access is denied.</f:Message>
        </f:WSManFault>
      </s:Detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

/// A fault whose header carries `padding` extra elements before the body.
fn padded_fault(padding: usize) -> String {
    let filler: String = (0..padding)
        .map(|i| format!("<p:Item Index=\"{}\">value &amp; more</p:Item>", i))
        .collect();
    FAULT_BODY.replace("</s:Header>", &format!("{}</s:Header>", filler))
}

fn soap_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/soap+xml;charset=UTF-8"),
    );
    headers
}

fn bench_parse_fault(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_fault");

    for padding in [0usize, 100, 1_000] {
        let body = padded_fault(padding);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(padding), &body, |b, body| {
            b.iter(|| parse_fault(black_box(body.as_bytes())))
        });
    }

    group.bench_function("malformed", |b| {
        b.iter(|| parse_fault(black_box(b"<s:Envelope><s:Body><s:Fault>")))
    });

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let soap = soap_headers();
    let plain = HeaderMap::new();

    group.bench_function("unauthorized", |b| {
        b.iter(|| classify(StatusCode::UNAUTHORIZED, &soap, black_box(FAULT_BODY.as_bytes())))
    });
    group.bench_function("soap_fault", |b| {
        b.iter(|| {
            classify(
                StatusCode::INTERNAL_SERVER_ERROR,
                &soap,
                black_box(FAULT_BODY.as_bytes()),
            )
        })
    });
    group.bench_function("transport", |b| {
        b.iter(|| classify(StatusCode::SERVICE_UNAVAILABLE, &plain, black_box(b"busy")))
    });

    group.finish();
}

fn bench_envelope_render(c: &mut Criterion) {
    let to = Url::parse("http://win01:5985/wsman").unwrap();
    let envelope = Envelope::new(&to, ACTION_GET)
        .resource_uri("http://schemas.microsoft.com/wbem/wsman/1/wmi/root/cimv2/Win32_Service")
        .selector("Name", "WinRM");

    c.bench_function("envelope_render", |b| b.iter(|| black_box(&envelope).to_xml()));
}

fn bench_delivery_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_raw(FAULT_BODY, "application/soap+xml;charset=UTF-8"),
            )
            .mount(&server)
            .await;
        server
    });

    let engine = DeliveryEngine::new(DeliveryConfig::default()).unwrap();
    let target = Target::parse(&format!("{}/wsman", server.uri()), "vagrant", "vagrant").unwrap();
    let (engine, target) = (&engine, &target);

    c.bench_function("deliver_fault", |b| {
        b.to_async(&rt)
            .iter(|| async move { engine.deliver(target, "<s:Envelope/>").await.unwrap_err() })
    });
}

criterion_group!(parsing_benches, bench_parse_fault, bench_classify);
criterion_group!(envelope_benches, bench_envelope_render);
criterion_group!(delivery_benches, bench_delivery_round_trip);

criterion_main!(parsing_benches, envelope_benches, delivery_benches);
