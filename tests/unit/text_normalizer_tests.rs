/*!
 * Tests for text normalization across both track formats
 */

use subsyncer::text_normalizer::{contains_cjk, has_words, normalize_caption, normalize_reference, words};

/// Test that the same sentence rendered by both formats compares equal
#[test]
fn test_normalize_withSameSentenceInBothFormats_shouldProduceSameWords() {
    let pairs = [
        ("<i>You're lying to me again.</i>", "You're lying to me again."),
        ("JOHN: I don't know", r"{\fs14}I don't know"),
        ("(sighs) We'll see", "We'll see■"),
        ("[thunder] \"It's over\"", r"{\an8}It's over"),
    ];

    for (reference, caption) in pairs {
        assert_eq!(
            words(&normalize_reference(reference)),
            words(&normalize_caption(caption)),
            "reference {:?} vs caption {:?}",
            reference,
            caption
        );
    }
}

#[test]
fn test_normalizeReference_withMultiLineCue_shouldKeepLineBreak() {
    let normalized = normalize_reference("<i>Then who was that woman</i>\nstanding in the hallway?");

    assert_eq!(normalized, "Then who was that woman\nstanding in the hallway?");
}

#[test]
fn test_normalizeReference_withSoundOnlyCue_shouldHaveNoWords() {
    assert!(!has_words(&normalize_reference("[DOOR SLAMS]")));
    assert!(!has_words(&normalize_reference("(gasps)")));
}

#[test]
fn test_normalizeCaption_withoutNoise_shouldOnlyTrim() {
    assert_eq!(normalize_caption("  Good night.  "), "Good night.");
}

#[test]
fn test_words_withNumbersAndUnderscores_shouldKeepThem() {
    assert_eq!(words("Room 101_b, now!"), vec!["room", "101_b", "now"]);
}

#[test]
fn test_containsCjk_withFullWidthPunctuationOnly_shouldBeFalse() {
    assert!(!contains_cjk("？！"));
    assert!(contains_cjk("晚安？"));
}
