/*!
 * Unit tests for the batch translator's bisection retry policy
 */

use std::sync::Arc;

use doctran::errors::TranslationError;
use doctran::providers::mock::MockProvider;
use doctran::translator::{BatchTranslator, MAX_BISECTION_DEPTH};

fn texts(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn numbered(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("text number {}", i)).collect()
}

#[tokio::test]
async fn test_translate_withAlignedResponse_shouldNotBisect() {
    let provider = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(provider.clone()));

    let out = translator.translate(&texts(&["a", "b", "c"])).await.unwrap();

    assert_eq!(
        out,
        texts(&["[xlated] a", "[xlated] b", "[xlated] c"])
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withEmptyInput_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let translator = BatchTranslator::new(Arc::new(provider.clone()));

    let out = translator.translate(&[]).await.unwrap();

    assert!(out.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_translate_withShortResponses_shouldRecoverByBisection() {
    // Batches over two items come back one short; halving twice reaches
    // all-passing sub-batches: 8 -> 4+4 -> 2+2+2+2, seven calls total.
    let provider = MockProvider::short_over(2);
    let translator = BatchTranslator::new(Arc::new(provider.clone()));
    let inputs = numbered(8);

    let out = translator.translate(&inputs).await.unwrap();

    assert_eq!(out.len(), inputs.len());
    for (input, output) in inputs.iter().zip(&out) {
        assert_eq!(output, &format!("[xlated] {}", input));
    }
    assert_eq!(provider.call_count(), 7);
}

#[tokio::test]
async fn test_translate_withSingleItemMismatch_shouldFailWithLengthMismatch() {
    let provider = MockProvider::short_array();
    let translator = BatchTranslator::new(Arc::new(provider));

    let err = translator.translate(&texts(&["only"])).await.unwrap_err();

    assert!(matches!(
        err,
        TranslationError::LengthMismatch {
            expected: 1,
            actual: 0
        }
    ));
}

#[tokio::test]
async fn test_translate_withPersistentShortArray_shouldTerminateAtSingleItems() {
    // Every response drops one element, so bisection bottoms out on a
    // one-item slice whose mismatch is terminal. No depth runaway.
    let provider = MockProvider::short_array();
    let translator = BatchTranslator::new(Arc::new(provider));

    let err = translator.translate(&numbered(4)).await.unwrap_err();

    assert!(matches!(err, TranslationError::LengthMismatch { .. }));
}

#[tokio::test]
async fn test_translate_withPersistentProtocolErrors_shouldStopAtDepthLimit() {
    // 64 items halve to 2-item slices at the last allowed level; the next
    // level is cut off by the depth limit before any provider call.
    let provider = MockProvider::malformed();
    let translator = BatchTranslator::new(Arc::new(provider));

    let err = translator.translate(&numbered(64)).await.unwrap_err();

    match err {
        TranslationError::DepthExceeded { max_depth, .. } => {
            assert_eq!(max_depth, MAX_BISECTION_DEPTH);
        }
        other => panic!("expected DepthExceeded, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withTransportError_shouldFailWithoutBisection() {
    let provider = MockProvider::failing();
    let translator = BatchTranslator::new(Arc::new(provider.clone()));

    let err = translator.translate(&numbered(4)).await.unwrap_err();

    assert!(matches!(err, TranslationError::Provider(_)));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withSingleItemProtocolError_shouldFailWithProviderError() {
    let provider = MockProvider::malformed();
    let translator = BatchTranslator::new(Arc::new(provider.clone()));

    let err = translator.translate(&texts(&["one"])).await.unwrap_err();

    assert!(matches!(err, TranslationError::Provider(_)));
    assert_eq!(provider.call_count(), 1);
}
