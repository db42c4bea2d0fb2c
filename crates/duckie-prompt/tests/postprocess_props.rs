// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for response normalization.

use duckie_prompt::{MIN_ANSWER_CHARS, PromptCodec, PromptMode};
use proptest::prelude::*;

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<|im_start|>".to_string()),
        Just("<|im_end|>".to_string()),
        Just("<|user|>".to_string()),
        Just("<|assistant|>".to_string()),
        Just("<|im_".to_string()),
        Just("end|>".to_string()),
        Just("<input>".to_string()),
        Just("</input>".to_string()),
        Just(".".to_string()),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just(PromptMode::Math.system_instruction().to_string()),
        "[а-яa-z0-9 ]{0,12}",
    ]
}

fn raw_answer() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..16).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn postprocess_is_idempotent(raw in raw_answer(), with_instruction in any::<bool>()) {
        let codec = PromptCodec::default();
        let instruction = with_instruction.then(|| PromptMode::Math.system_instruction());
        let once = codec.postprocess(&raw, instruction);
        let twice = codec.postprocess(&once, instruction);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn postprocess_output_is_clean(raw in raw_answer()) {
        let codec = PromptCodec::default();
        let out = codec.postprocess(&raw, Some(PromptMode::Math.system_instruction()));
        prop_assert!(out.chars().count() >= MIN_ANSWER_CHARS);
        prop_assert!(!out.contains("<|im_end|>"));
        prop_assert!(!out.contains("<|im_start|>"));
        prop_assert_eq!(out.trim(), out.as_str());
    }
}
