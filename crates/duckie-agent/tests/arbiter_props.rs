// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests: the session slot behaves like a single optional holder
//! under any sequence of acquisitions and releases.

use duckie_agent::SessionArbiter;
use duckie_core::{ChatId, UserId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Acquire(i64, i64),
    Release(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4i64, 0..4i64).prop_map(|(user, chat)| Op::Acquire(user, chat)),
        (0..4i64).prop_map(Op::Release),
    ]
}

proptest! {
    #[test]
    fn arbiter_matches_single_slot_model(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let arbiter = SessionArbiter::new();
            let mut model: Option<(UserId, ChatId)> = None;

            for op in ops {
                match op {
                    Op::Acquire(user, chat) => {
                        let (user, chat) = (UserId(user), ChatId(chat));
                        let expected = match model {
                            None => {
                                model = Some((user, chat));
                                true
                            }
                            Some((holder, _)) => holder == user,
                        };
                        assert_eq!(arbiter.try_acquire(user, chat).await, expected);
                    }
                    Op::Release(user) => {
                        let user = UserId(user);
                        let expected = model.is_some_and(|(holder, _)| holder == user);
                        if expected {
                            model = None;
                        }
                        assert_eq!(arbiter.release(user).await, expected);
                    }
                }
                assert_eq!(arbiter.current_holder(), model);
            }
        });
    }
}
