//! End-to-end distillation over realistic 8-K filings.

use std::io::Write;

use edgarsift_core::{BudgetStrategy, DistillConfig, Error};
use edgarsift_distill::extract::RelevanceScorer;
use edgarsift_distill::{DateTier, Distiller, RawDocument};
use flate2::write::GzEncoder;
use flate2::Compression;

const SAMPLE_8K: &str = "<SEC-DOCUMENT>0001193125-25-000001.txt : 20250726
<SEC-HEADER>0001193125-25-000001.hdr.sgml : 20250726
ACCESSION NUMBER:\t\t0001193125-25-000001
CONFORMED SUBMISSION TYPE:\t8-K
CONFORMED PERIOD OF REPORT:\t20250724
FILED AS OF DATE:\t\t20250726
</SEC-HEADER>
<DOCUMENT>
<TYPE>8-K
<TEXT>
<html><body>
<p>UNITED STATES SECURITIES AND EXCHANGE COMMISSION</p>
<p>FORM 8-K</p>
<p>Date of Report (Date of earliest event reported): July 24, 2025</p>
<p><b>Item 5.02 Departure of Directors or Certain Officers; Election of Directors.</b></p>
<p>On July 24, 2025, the Board of Directors appointed Jane Roe as Chief Financial Officer of the Company,
effective August 1, 2025. Ms. Roe will receive an annual base salary of $450,000 and a grant of
120,000 shares of restricted stock.</p>
<p>Ms. Roe succeeds John Doe, who resigned as Chief Financial Officer to pursue other opportunities.
His resignation was not the result of any disagreement with the Company.</p>
<table><tr><td>Name</td><td>Position</td></tr><tr><td>Jane Roe</td><td>Chief Financial Officer</td></tr></table>
<p><b>Item 9.01 Financial Statements and Exhibits.</b></p>
<p>(d) Exhibits. Exhibit 99.1 Press release dated July 24, 2025 announcing the appointment of the new officer.</p>
<p>SIGNATURES</p>
<p>Pursuant to the requirements of the Securities Exchange Act of 1934, the registrant has duly caused
this report to be signed on its behalf.</p>
</body></html>
</TEXT>
</DOCUMENT>
</SEC-DOCUMENT>
";

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Every default item with a long body, so the budget has to kick in.
fn oversized_filing() -> String {
    let filler = "The merger agreement with the chief executive officer was amended to extend the term. ";
    let mut html = String::from("<html><body>");
    for (major, minor) in [(1, 1), (1, 2), (2, 1), (2, 2), (3, 2), (4, 1), (5, 2), (7, 1), (8, 1), (9, 1)] {
        html.push_str(&format!(
            "<p>Item {}.{:02} Heading.</p><p>{}</p>",
            major,
            minor,
            filler.repeat(30)
        ));
    }
    html.push_str("</body></html>");
    html
}

#[test]
fn test_sample_date_and_sections() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let out = distiller.distill(RawDocument::Text(SAMPLE_8K), Some("2000-01-01"));

    assert_eq!(out.filing_date, "2025-07-24");
    assert_eq!(out.date_tier, DateTier::Header);
    assert_eq!(out.sections, vec!["ITEM_5_02", "ITEM_9_01"]);
    assert!(out.sentence_count >= 1);
    assert!(!out.truncated);
}

#[test]
fn test_section_block_stops_before_next_item() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let out = distiller.distill(RawDocument::Text(SAMPLE_8K), None);

    let blocks: Vec<&str> = out.distillate.split("\n\n").collect();
    assert!(blocks[0].starts_with("[Departure or Appointment of Directors and Officers]\nItem 5.02"));
    assert!(!blocks[0].contains("Item 9.01"));
    assert!(blocks[1].starts_with("[Financial Statements and Exhibits]\nItem 9.01"));
    assert!(!blocks[1].contains("SIGNATURES"));
}

#[test]
fn test_sample_figures_and_supplementary() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let out = distiller.distill(RawDocument::Text(SAMPLE_8K), None);

    assert!(out.distillate.contains("Key figures: $450,000, 120,000 shares"));
    assert!(out.distillate.contains("[Tables]\nName Position Jane Roe Chief Financial Officer"));
    assert!(out.distillate.contains("[Emphasis]\nItem 5.02 Departure"));
}

#[test]
fn test_deterministic_output() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let a = distiller.distill(RawDocument::Text(SAMPLE_8K), Some("2000-01-01"));
    let b = distiller.distill(RawDocument::Text(SAMPLE_8K), Some("2000-01-01"));
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_gzip_matches_plain_bytes() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let plain = distiller.distill(RawDocument::Bytes(SAMPLE_8K.as_bytes()), None);
    let compressed = gzip(SAMPLE_8K.as_bytes());
    let inflated = distiller.distill(RawDocument::Bytes(&compressed), None);

    assert_eq!(plain.distillate, inflated.distillate);
    assert_eq!(plain.content_hash, inflated.content_hash);
    assert_eq!(inflated.filing_date, "2025-07-24");
}

#[test]
fn test_output_within_ceilings() {
    let html = oversized_filing();
    for strategy in [BudgetStrategy::Truncate, BudgetStrategy::DropBlocks] {
        let mut config = DistillConfig::default();
        config.limits.budget_strategy = strategy;
        let distiller = Distiller::new(&config).unwrap();
        let out = distiller.distill(RawDocument::Text(&html), None);

        assert!(out.distillate.chars().count() <= config.limits.char_ceiling, "{:?}", strategy);
        assert!(out.block_count <= config.limits.max_blocks);
        assert!(out.estimated_tokens <= config.limits.token_soft_ceiling);
        assert!(out.truncated);
        assert_eq!(out.sections.len(), 10);
    }
}

#[test]
fn test_block_cap_respected() {
    let mut config = DistillConfig::default();
    config.limits.max_blocks = 4;
    let distiller = Distiller::new(&config).unwrap();
    let out = distiller.distill(RawDocument::Text(&oversized_filing()), None);
    assert_eq!(out.distillate.split("\n\n").count(), 4);
}

#[test]
fn test_empty_batch_is_error() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    assert!(matches!(distiller.distill_all(&[], None), Err(Error::NoDocument)));
}

#[test]
fn test_batch_keeps_input_order() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let docs = [
        RawDocument::Text("<p>Date of Report: March 3, 2021</p>"),
        RawDocument::Text(SAMPLE_8K),
        RawDocument::Bytes(&[]),
    ];
    let out = distiller.distill_all(&docs, Some("2019-12-31")).unwrap();
    let dates: Vec<&str> = out.iter().map(|d| d.filing_date.as_str()).collect();
    assert_eq!(dates, vec!["2021-03-03", "2025-07-24", "2019-12-31"]);
}

#[test]
fn test_short_sentence_never_selected() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    // 30 chars, two keyword categories.
    let sentence = "Merger and lawsuit news today.";
    assert_eq!(sentence.len(), 30);
    let out = distiller.distill(RawDocument::Text(&format!("<p>{}</p>", sentence)), None);
    assert_eq!(out.sentence_count, 0);
    assert!(!out.distillate.contains("Merger"));
}

#[test]
fn test_two_categories_score_sum() {
    let config = DistillConfig::default();
    let scorer = RelevanceScorer::new(&config.keywords, &config.limits);
    let (score, categories) =
        scorer.score("The chief executive officer stepped down shortly after the merger closed");
    assert_eq!(score, 5.5);
    assert_eq!(categories, vec!["deal", "leadership"]);
}

#[test]
fn test_binary_garbage_degrades_to_default() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let bytes: Vec<u8> = (0..16 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state & 0xff) as u8
        })
        .collect();
    let out = distiller.distill(RawDocument::Bytes(&bytes), Some("2020-02-02"));
    assert!(out.distillate.chars().count() <= config.limits.char_ceiling);
    assert_eq!(out.filing_date.len(), 10);
}

#[test]
fn test_distillation_json_shape() {
    let config = DistillConfig::default();
    let distiller = Distiller::new(&config).unwrap();
    let out = distiller.distill(RawDocument::Text(SAMPLE_8K), None);
    let json = serde_json::to_value(&out).unwrap();

    assert!(json["distillate"].is_string());
    assert_eq!(json["filing_date"], "2025-07-24");
    assert_eq!(json["date_tier"], "header");
    assert_eq!(json["parser"], "lenient");
    assert!(json["sections"].is_array());
    assert_eq!(json["content_hash"].as_str().map(str::len), Some(64));
}
