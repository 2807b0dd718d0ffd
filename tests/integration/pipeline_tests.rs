/*!
 * End-to-end pipeline tests: plan, translate, checkpoint, resume, finalize.
 *
 * All tests drive the controller through `run_with_interrupt` with an
 * injected mock backend, so no network or subprocess is involved.
 */

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use crate::common;
use doctran::app_controller::Controller;
use doctran::document::DocumentEncoding;
use doctran::errors::AppError;
use doctran::providers::mock::MockProvider;

fn not_interrupted() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[tokio::test]
async fn test_run_withUtf16Input_shouldTranslateAndPreserveEncoding() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "in.xml",
        &common::utf16le_bytes(common::SAMPLE_XML),
    )?;
    let output = dir.path().join("out.xml");
    let config = common::run_config(input, output.clone());

    let provider = MockProvider::mapped(&[
        ("Namo tassa", "나모 땃사"),
        ("bhagavato arahato", "바가와또 아라하또"),
    ]);
    let controller = Controller::with_provider(config.clone(), Arc::new(provider.clone()));
    controller.run_with_interrupt(not_interrupted()).await?;

    let raw = std::fs::read(&output)?;
    assert_eq!(&raw[..2], &[0xFF, 0xFE], "output must keep the UTF-16LE BOM");
    let (text, encoding) = DocumentEncoding::decode(&raw)?;
    assert_eq!(encoding, DocumentEncoding::Utf16Le);
    assert!(text.contains("나모 땃사"));
    assert!(text.contains("바가와또 아라하또"));
    // Skip-tag markers and non-translatable leaves survive unchanged.
    assert!(text.contains("<pb n=\"3\"/>"));
    assert!(text.contains("<p>42</p>"));
    assert!(text.contains("<p>   </p>"));

    // One batch covers both items under the default budget.
    assert_eq!(provider.call_count(), 1);
    assert!(config.state_path().exists());
    assert!(doctran::reassembly::partial_output_path(&output).exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withCompletedCheckpoint_shouldNotCallProviderAgain() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "in.xml",
        common::SAMPLE_XML.as_bytes(),
    )?;
    let output = dir.path().join("out.xml");
    let config = common::run_config(input, output.clone());

    let first = MockProvider::working();
    Controller::with_provider(config.clone(), Arc::new(first))
        .run_with_interrupt(not_interrupted())
        .await?;
    let first_output = std::fs::read(&output)?;

    // Second run over the same configuration adopts the checkpoint and
    // finalizes without a single provider call.
    let second = MockProvider::working();
    Controller::with_provider(config, Arc::new(second.clone()))
        .run_with_interrupt(not_interrupted())
        .await?;

    assert_eq!(second.call_count(), 0);
    assert_eq!(std::fs::read(&output)?, first_output);
    Ok(())
}

#[tokio::test]
async fn test_run_afterMidRunFailure_shouldResumeOnlyPendingItems() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "in.xml",
        common::SAMPLE_XML.as_bytes(),
    )?;
    let output = dir.path().join("out.xml");
    // A 12-char budget splits "bhagavato arahato" into two pieces and forces
    // one item per batch: ["Namo tassa"], ["bhagavato"], ["arahato"].
    let mut config = common::run_config(input, output.clone());
    config.max_batch_chars = 12;

    let flaky = MockProvider::fail_after(1);
    let failed = Controller::with_provider(config.clone(), Arc::new(flaky.clone()))
        .run_with_interrupt(not_interrupted())
        .await;
    let err = failed.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Translation(_))
    ));
    assert_eq!(flaky.call_count(), 2, "second batch fails, run stops there");
    assert!(config.state_path().exists());
    assert!(!output.exists());

    let fresh = MockProvider::working();
    Controller::with_provider(config, Arc::new(fresh.clone()))
        .run_with_interrupt(not_interrupted())
        .await?;

    // Only the two pending pieces go out; the first batch is already done.
    assert_eq!(
        fresh.requests(),
        vec![
            vec!["bhagavato".to_string()],
            vec!["arahato".to_string()],
        ]
    );
    let text = String::from_utf8(std::fs::read(&output)?)?;
    assert!(text.contains("[xlated] Namo tassa"));
    assert!(text.contains("[xlated] bhagavato [xlated] arahato"));
    Ok(())
}

#[tokio::test]
async fn test_run_withInterruptBeforeFirstBatch_shouldCheckpointAndStop() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "in.xml",
        common::SAMPLE_XML.as_bytes(),
    )?;
    let output = dir.path().join("out.xml");
    let config = common::run_config(input, output.clone());

    let provider = MockProvider::working();
    let interrupted = Arc::new(AtomicBool::new(true));
    let err = Controller::with_provider(config.clone(), Arc::new(provider.clone()))
        .run_with_interrupt(interrupted)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Interrupted)
    ));
    assert_eq!(provider.call_count(), 0);
    assert!(config.state_path().exists());
    assert!(!output.exists());

    // The partial snapshot still renders, with every node at its original text.
    let partial = doctran::reassembly::partial_output_path(&output);
    let text = String::from_utf8(std::fs::read(partial)?)?;
    assert!(text.contains("Namo tassa"));
    assert!(text.contains("bhagavato arahato"));
    Ok(())
}
