//! Active-language context.
//!
//! Every `LocaleContext` has its own slot in two per-flow stores:
//!
//! - a `tokio` task-local map, present only inside [`LocaleContext::scope`]
//!   and [`LocaleContext::scope_with`];
//! - a thread-local map, used by plain threads that are not driving a
//!   `tokio` runtime.
//!
//! A scope is seeded with a copy of the caller's values, so a child flow
//! starts with its parent's active language but its later changes never
//! reach the parent or its siblings.
//!
//! Runtime worker threads interleave many tasks, so their thread-local map
//! would be shared by every unscoped task. On a runtime thread outside a
//! scope, `set_active` is ignored and `get_active` reports the default
//! language.

use crate::i18n::language::Language;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

type ActiveLanguages = HashMap<u64, Language>;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_ACTIVE: RefCell<ActiveLanguages> = RefCell::new(HashMap::new());
}

tokio::task_local! {
    static TASK_ACTIVE: RefCell<ActiveLanguages>;
}

/// Holds the active language of the current logical flow for one translator.
#[derive(Debug)]
pub struct LocaleContext {
    id: u64,
    default_language: Language,
}

impl LocaleContext {
    /// Create a context whose active language is `default_language` until set.
    pub fn new(default_language: Language) -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            default_language,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// The language reported when none was set in this flow.
    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// The active language of this flow, or the default language if none was set.
    pub fn get_active(&self) -> Language {
        self.explicit_active()
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// The active language if one was set in this flow.
    pub fn explicit_active(&self) -> Option<Language> {
        match TASK_ACTIVE.try_with(|cell| cell.borrow().get(&self.id).cloned()) {
            Ok(active) => active,
            Err(_) if on_runtime_thread() => None,
            Err(_) => THREAD_ACTIVE.with(|cell| cell.borrow().get(&self.id).cloned()),
        }
    }

    /// Set the active language for the rest of this flow.
    ///
    /// The language is not checked against any supported set. On a `tokio`
    /// runtime thread the call only takes effect inside a scope.
    pub fn set_active(&self, language: impl Into<Language>) {
        let language = language.into();
        if !self.store(Some(language.clone())) {
            warn!(
                "Ignoring active language '{}' set outside a locale scope on a runtime thread",
                language
            );
        }
    }

    /// Forget the active language, reverting to the default language.
    pub fn clear_active(&self) {
        self.store(None);
    }

    /// Run `future` as its own flow.
    ///
    /// The flow starts with the active languages visible at the time of the
    /// call. Wrap futures handed to `tokio::spawn` with this to give each
    /// task an isolated, inherited active language.
    pub fn scope<F: Future>(future: F) -> impl Future<Output = F::Output> {
        TASK_ACTIVE.scope(RefCell::new(snapshot()), future)
    }

    /// Run `future` as its own flow with `language` active for this context.
    ///
    /// This is the entry point for per-request work: the transport layer
    /// wraps each request handler with the language it parsed.
    pub fn scope_with<F: Future>(
        &self,
        language: impl Into<Language>,
        future: F,
    ) -> impl Future<Output = F::Output> {
        let mut seeded = snapshot();
        seeded.insert(self.id, language.into());
        TASK_ACTIVE.scope(RefCell::new(seeded), future)
    }

    /// Run `f` on the current thread, restoring every active language afterwards.
    pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
        let _restore = RestoreOnDrop(Some(snapshot()));
        f()
    }

    /// Write this context's slot in the current flow. Returns false when the
    /// current flow has no slot to write.
    fn store(&self, language: Option<Language>) -> bool {
        let update = |active: &mut ActiveLanguages, language: Option<Language>| match language {
            Some(language) => {
                active.insert(self.id, language);
            }
            None => {
                active.remove(&self.id);
            }
        };

        if TASK_ACTIVE
            .try_with(|cell| update(&mut cell.borrow_mut(), language.clone()))
            .is_ok()
        {
            return true;
        }
        if on_runtime_thread() {
            return false;
        }
        THREAD_ACTIVE.with(|cell| update(&mut cell.borrow_mut(), language));
        true
    }
}

impl Drop for LocaleContext {
    /// Remove this context's slot from the current flow. Slots on other
    /// threads are released when those threads exit.
    fn drop(&mut self) {
        let id = self.id;
        let _ = TASK_ACTIVE.try_with(|cell| {
            if let Ok(mut active) = cell.try_borrow_mut() {
                active.remove(&id);
            }
        });
        let _ = THREAD_ACTIVE.try_with(|cell| {
            if let Ok(mut active) = cell.try_borrow_mut() {
                active.remove(&id);
            }
        });
    }
}

fn on_runtime_thread() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

fn snapshot() -> ActiveLanguages {
    match TASK_ACTIVE.try_with(|cell| cell.borrow().clone()) {
        Ok(active) => active,
        Err(_) if on_runtime_thread() => ActiveLanguages::new(),
        Err(_) => THREAD_ACTIVE.with(|cell| cell.borrow().clone()),
    }
}

fn restore(saved: ActiveLanguages) {
    let mut saved = Some(saved);
    let in_task = TASK_ACTIVE
        .try_with(|cell| {
            if let Some(saved) = saved.take() {
                *cell.borrow_mut() = saved;
            }
        })
        .is_ok();
    if in_task || on_runtime_thread() {
        return;
    }
    if let Some(saved) = saved {
        THREAD_ACTIVE.with(|cell| *cell.borrow_mut() = saved);
    }
}

struct RestoreOnDrop(Option<ActiveLanguages>);

impl Drop for RestoreOnDrop {
    fn drop(&mut self) {
        if let Some(saved) = self.0.take() {
            restore(saved);
        }
    }
}
