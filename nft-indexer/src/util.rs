// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Small helpers shared by the native and browser builds.

/// Bounds every API client must meet. Native clients are shared between the tasks of
/// a multi-threaded runtime, so they must be `Send + Sync`. In the browser, clients
/// wrap JS values and stay on the one thread there is.
#[cfg(web)]
pub trait AutoTraits: 'static {}
#[cfg(web)]
impl<T: 'static> AutoTraits for T {}

/// Bounds every API client must meet: `Send + Sync + 'static` on native targets.
#[cfg(not(web))]
pub trait AutoTraits: Send + Sync + 'static {}
#[cfg(not(web))]
impl<T: Send + Sync + 'static> AutoTraits for T {}

/// Shortens an account for display: the first five characters, an ellipsis, and the
/// last five characters. Accounts of ten characters or fewer are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}
