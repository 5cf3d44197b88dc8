// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pool backing a channel.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::{Builder, Runtime};

/// Async workers driving socket reads and writes. Inbound calls run on the
/// runtime's blocking pool, which grows on demand.
const WORKER_THREADS: usize = 2;

/// Build the runtime for channel `name`.
///
/// Threads are named `<name> pool thread #<n>`, numbered from 1 in creation
/// order. None of them keeps the process alive once `main` returns.
pub(crate) fn worker_pool(name: &str) -> io::Result<Runtime> {
    let prefix = name.to_string();
    let iota = AtomicUsize::new(1);
    Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name_fn(move || {
            format!("{} pool thread #{}", prefix, iota.fetch_add(1, Ordering::Relaxed))
        })
        .enable_all()
        .build()
}
