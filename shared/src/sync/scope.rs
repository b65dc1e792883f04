use tokio_util::sync::CancellationToken;

/// Cancellation token for an in-flight wait.
///
/// Clones share state. A child scope counts as cancelled as soon as any of
/// its ancestors is, so cancelling a cell's owner scope abandons every wait
/// opened beneath it.
#[derive(Clone)]
pub struct CancelScope {
    token: CancellationToken,
}

impl CancelScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A scope cancelled whenever this one is. Born cancelled if this one
    /// already is.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Idempotent; cancelling twice is a no-op
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds at most one live scope. Opening a new one cancels the previous.
#[derive(Default)]
pub struct ScopeSlot {
    current: Option<CancelScope>,
}

impl ScopeSlot {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn renew(&mut self, parent: &CancelScope) -> CancelScope {
        self.cancel();
        let scope = parent.child();
        self.current = Some(scope.clone());
        scope
    }

    pub fn cancel(&mut self) {
        if let Some(scope) = self.current.take() {
            scope.cancel();
        }
    }

    pub fn is_live(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|scope| !scope.is_cancelled())
    }
}
