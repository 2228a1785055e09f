// ABOUTME: Process-wide lock for tests that read or write environment variables.
// ABOUTME: Every env-touching test module in this crate shares it, since they run in one test binary.

use std::sync::{Mutex, MutexGuard};

pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Hold ENV_MUTEX for the caller's scope. A panicking test must not wedge the others.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_survives_a_poisoning_panic() {
        let _ = std::thread::spawn(|| {
            let _guard = env_lock();
            panic!("poison the env lock");
        })
        .join();

        // Reacquire after the poisoning thread is gone.
        drop(env_lock());
    }
}
