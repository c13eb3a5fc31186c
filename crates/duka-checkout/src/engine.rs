//! # Checkout Engine
//!
//! Drives the single active payment flow over the shared till state.
//!
//! ## Flow Orchestration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CheckoutEngine                                   │
//! │                                                                         │
//! │   operator calls                 spawned tasks                          │
//! │   ──────────────                 ─────────────                          │
//! │   start_checkout ──┐                                                    │
//! │   select_method ───┤   lock    ┌──────────────┐  step_interval          │
//! │   send_confirma… ──┼─────────► │ EngineState  │◄─── processing timer    │
//! │   cancel_* ────────┤           │  register    │  completion_delay       │
//! │   retry_payment ───┘           │  flow        │◄─── commit task ──► backend
//! │                                │  last_sale   │                         │
//! │                                │  epoch ──────┼── stale-work guard      │
//! │                                └──────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Epoch Guard
//!
//! Timers and commit calls run as spawned tasks and report back later. Every
//! flow transition bumps `epoch`; a task captures the epoch it was spawned
//! under and its result is dropped on mismatch. That is the whole stale-work
//! story: a cancelled checkout cannot be resurrected by a late tick or a late
//! commit response.
//!
//! ## The Commit Snapshot
//!
//! The cart is frozen into a [`CartSnapshot`] the first time a flow triggers
//! a commit. Retries after a decline reuse that frozen snapshot, so the
//! backend sees the same lines on attempt 2 that it declined on attempt 1,
//! whatever the operator did to the cart in between.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use duka_core::{
    validation, CartSnapshot, CartSummary, CustomerSession, EntryPoint, FailureCode,
    InventoryItem, Money, PaymentFlow, PaymentMethod, PaymentStage, Register, SaleRecord,
    CONFIRMATION_STEPS, FINAL_CONFIRMATION_STEP,
};

use crate::backend::{CatalogProvider, CommitOutcome, SaleCommitService};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Engine State
// =============================================================================

/// The active flow plus its engine-side bookkeeping.
#[derive(Debug)]
struct FlowState {
    flow: PaymentFlow,

    /// Confirmation progress, 1-based while processing, 0 otherwise.
    processing_step: u8,

    /// Cart frozen at the first commit trigger. Retries reuse it.
    snapshot: Option<CartSnapshot>,

    /// A commit task has been spawned and has not reported back yet.
    commit_in_flight: bool,
}

impl FlowState {
    fn new(flow: PaymentFlow) -> Self {
        FlowState {
            flow,
            processing_step: 0,
            snapshot: None,
            commit_in_flight: false,
        }
    }
}

/// Everything behind the engine's single lock.
#[derive(Debug)]
struct EngineState {
    register: Register,
    flow: Option<FlowState>,
    last_sale: Option<SaleRecord>,
    epoch: u64,
}

impl EngineState {
    fn new() -> Self {
        EngineState {
            register: Register::new(),
            flow: None,
            last_sale: None,
            epoch: 0,
        }
    }

    /// Disowns every timer and commit task spawned so far. Their results
    /// carry the epoch they were spawned under and are dropped on mismatch,
    /// so the in-flight marker resets along with the bump.
    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(flow_state) = self.flow.as_mut() {
            flow_state.commit_in_flight = false;
        }
    }
}

// =============================================================================
// Status Projection
// =============================================================================

/// One read of everything a payment screen needs.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStatus {
    /// The active flow, if any.
    pub flow: Option<PaymentFlow>,

    /// Confirmation progress, 1-based while processing, 0 otherwise.
    pub processing_step: u8,

    /// Open customer sessions.
    pub open_sessions: usize,

    /// The session whose tab is in front.
    pub active_session_id: Option<String>,
}

impl CheckoutStatus {
    /// Label of the active confirmation step, while the flow is processing.
    pub fn step_label(&self) -> Option<&'static str> {
        if self.processing_step == 0 {
            return None;
        }
        CONFIRMATION_STEPS.get(self.processing_step as usize).copied()
    }
}

// =============================================================================
// Checkout Engine
// =============================================================================

/// The async shell around [`Register`]: one lock, one flow, spawned timers
/// and commit calls guarded by an epoch.
///
/// Cloning is cheap and shares the same till.
#[derive(Clone)]
pub struct CheckoutEngine {
    state: Arc<Mutex<EngineState>>,
    catalog: Arc<dyn CatalogProvider>,
    commit: Arc<dyn SaleCommitService>,
    step_interval: Duration,
    completion_delay: Duration,
}

impl CheckoutEngine {
    /// Creates an engine with an empty till. Call
    /// [`refresh_catalog`](Self::refresh_catalog) to load items.
    pub fn new(
        config: &CheckoutConfig,
        catalog: Arc<dyn CatalogProvider>,
        commit: Arc<dyn SaleCommitService>,
    ) -> Self {
        CheckoutEngine {
            state: Arc::new(Mutex::new(EngineState::new())),
            catalog,
            commit,
            step_interval: config.step_interval(),
            completion_delay: config.completion_delay(),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetches the catalog and replaces the till's cached copy.
    ///
    /// The refreshed stock always wins over earlier optimistic decrements.
    /// Returns the number of items received.
    pub async fn refresh_catalog(&self) -> CheckoutResult<usize> {
        let items = self.catalog.list_items().await?;
        let count = items.len();
        let mut state = self.state.lock().await;
        state.register.replace_inventory(items);
        Ok(count)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All cached catalog items.
    pub async fn items(&self) -> Vec<InventoryItem> {
        self.state.lock().await.register.items().to_vec()
    }

    /// One cached catalog item.
    pub async fn item(&self, item_id: &str) -> Option<InventoryItem> {
        self.state.lock().await.register.item(item_id).cloned()
    }

    /// Display summary of one cart.
    pub async fn summary(&self, entry: &EntryPoint) -> CartSummary {
        self.state.lock().await.register.summary(entry)
    }

    /// Headroom left for an item across all open carts.
    pub async fn remaining_stock(&self, item_id: &str) -> i64 {
        self.state.lock().await.register.remaining_stock(item_id)
    }

    /// All open customer sessions, oldest first.
    pub async fn sessions(&self) -> Vec<CustomerSession> {
        self.state
            .lock()
            .await
            .register
            .sessions()
            .iter()
            .cloned()
            .collect()
    }

    /// The active flow, if any.
    pub async fn current_flow(&self) -> Option<PaymentFlow> {
        self.state
            .lock()
            .await
            .flow
            .as_ref()
            .map(|flow_state| flow_state.flow.clone())
    }

    /// The most recent committed sale, until a new checkout starts.
    pub async fn last_sale(&self) -> Option<SaleRecord> {
        self.state.lock().await.last_sale.clone()
    }

    /// One read of the flow, progress, and session counters.
    pub async fn status(&self) -> CheckoutStatus {
        let state = self.state.lock().await;
        CheckoutStatus {
            flow: state.flow.as_ref().map(|flow_state| flow_state.flow.clone()),
            processing_step: state
                .flow
                .as_ref()
                .map(|flow_state| flow_state.processing_step)
                .unwrap_or(0),
            open_sessions: state.register.sessions().len(),
            active_session_id: state
                .register
                .sessions()
                .active_id()
                .map(|id| id.to_string()),
        }
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================
    // Carts stay editable while a flow is open; the commit snapshot is what
    // protects an in-progress payment from edits.

    /// One tap on a catalog tile: grow the quick cart's line by 1.
    pub async fn quick_add(&self, item_id: &str) -> i64 {
        self.state.lock().await.register.quick_add(item_id)
    }

    /// Grows a cart line, clamped to availability. Returns the applied
    /// quantity.
    pub async fn add_or_increment(&self, entry: &EntryPoint, item_id: &str, desired: i64) -> i64 {
        self.state
            .lock()
            .await
            .register
            .add_or_increment(entry, item_id, desired)
    }

    /// Sets a line to an exact quantity, clamped to availability. Returns
    /// the applied quantity; 0 means the line was removed.
    pub async fn set_quantity(&self, entry: &EntryPoint, item_id: &str, desired: i64) -> i64 {
        self.state
            .lock()
            .await
            .register
            .set_quantity(entry, item_id, desired)
    }

    /// Overrides a line's unit price. Non-positive prices are rejected.
    pub async fn set_unit_price(&self, entry: &EntryPoint, item_id: &str, price: Money) -> bool {
        self.state
            .lock()
            .await
            .register
            .set_unit_price(entry, item_id, price)
    }

    /// Removes a line, freeing its reservation.
    pub async fn remove_line(&self, entry: &EntryPoint, item_id: &str) -> bool {
        self.state.lock().await.register.remove_line(entry, item_id)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Opens a new customer session and makes it active.
    pub async fn create_session(&self) -> CustomerSession {
        self.state.lock().await.register.create_session().clone()
    }

    /// Closes a session, discarding its cart and freeing its reservations.
    pub async fn close_session(&self, session_id: &str) -> bool {
        self.state.lock().await.register.close_session(session_id)
    }

    /// Switches which session is active.
    pub async fn set_active_session(&self, session_id: &str) -> bool {
        self.state.lock().await.register.set_active_session(session_id)
    }

    // =========================================================================
    // Flow Operations
    // =========================================================================

    /// Starts a checkout for one cart.
    ///
    /// ## Behavior
    ///
    /// - Empty cart: refused
    /// - A flow still in a live stage: refused
    /// - A flow parked at success/sale-complete: silently replaced, and the
    ///   retained sale record is cleared for the new flow
    pub async fn start_checkout(&self, entry: &EntryPoint) -> bool {
        let mut state = self.state.lock().await;

        let cart_empty = state
            .register
            .cart(entry)
            .map(|cart| cart.is_empty())
            .unwrap_or(true);
        if cart_empty {
            debug!(entry = %entry, "checkout refused, cart is empty");
            return false;
        }

        if let Some(flow_state) = state.flow.as_ref() {
            if !flow_state.flow.stage.is_terminal() {
                debug!(
                    entry = %entry,
                    stage = %flow_state.flow.stage,
                    "checkout refused, another flow is still live"
                );
                return false;
            }
        }

        let reference_id = generate_reference_id();
        info!(entry = %entry, reference_id = %reference_id, "checkout started");
        state.last_sale = None;
        state.flow = Some(FlowState::new(PaymentFlow::new(entry.clone(), reference_id)));
        state.bump_epoch();
        true
    }

    /// Chooses the payment method.
    ///
    /// Cash and card confirm instantly: the commit fires right away and the
    /// visible stage stays put until the backend answers. M-Pesa returns the
    /// flow to the method stage so the operator can capture the phone.
    ///
    /// Allowed at the method stage and, for switching methods, at the
    /// failure stage. Switching does not touch the attempt counter.
    pub async fn select_method(&self, method: PaymentMethod) -> CheckoutResult<()> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        let stage = flow_state.flow.stage;
        if !matches!(stage, PaymentStage::Method | PaymentStage::Failure) {
            return Err(CheckoutError::UnexpectedStage {
                expected: "method or failure".into(),
                actual: stage.to_string(),
            });
        }
        if flow_state.commit_in_flight {
            return Err(CheckoutError::CommitInFlight);
        }

        state.bump_epoch();
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.flow.method = Some(method);
            flow_state.flow.error_code = None;
            flow_state.processing_step = 0;
            if method == PaymentMethod::Mpesa {
                // back to phone capture; an earlier phone entry is kept
                flow_state.flow.stage = PaymentStage::Method;
            }
        }

        if method.is_instant() {
            debug!(method = method.label(), "instant method selected, committing");
            self.trigger_commit_locked(&mut state);
        }
        Ok(())
    }

    /// Sends the M-Pesa confirmation request (STK push) to a phone.
    ///
    /// The raw input is normalized first; a number that does not come out as
    /// `+2547XXXXXXXX` is rejected and the flow stays at the method stage
    /// with nothing recorded. On success the flow enters processing at step 1
    /// and the step timer starts.
    ///
    /// Returns the normalized phone number.
    pub async fn send_confirmation_request(&self, raw_phone: &str) -> CheckoutResult<String> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::Method {
            return Err(CheckoutError::UnexpectedStage {
                expected: "method".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }
        if flow_state.commit_in_flight {
            return Err(CheckoutError::CommitInFlight);
        }
        let reference_id = flow_state.flow.reference_id.clone();

        let phone = validation::validate_mpesa_phone(raw_phone)?;

        state.bump_epoch();
        let epoch = state.epoch;
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.flow.method = Some(PaymentMethod::Mpesa);
            flow_state.flow.phone_number = Some(phone.clone());
            flow_state.flow.error_code = None;
            flow_state.flow.stage = PaymentStage::Processing;
            flow_state.processing_step = 1;
        }
        info!(reference_id = %reference_id, phone = %phone, "confirmation request sent");
        self.spawn_processing_timer(epoch);
        Ok(phone)
    }

    /// Re-sends the confirmation request: progress returns to step 1 and the
    /// step timer restarts. The attempt counter is not touched.
    pub async fn resend_confirmation(&self) -> CheckoutResult<()> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::Processing {
            return Err(CheckoutError::UnexpectedStage {
                expected: "processing".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }
        if flow_state.commit_in_flight {
            return Err(CheckoutError::CommitInFlight);
        }

        state.bump_epoch();
        let epoch = state.epoch;
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.processing_step = 1;
        }
        debug!("confirmation request resent");
        self.spawn_processing_timer(epoch);
        Ok(())
    }

    /// Aborts while waiting for the customer: the flow moves to the failure
    /// stage with the customer-cancelled code. The cart is untouched and the
    /// operator can retry, switch to cash, or cancel outright.
    pub async fn cancel_processing(&self) -> CheckoutResult<()> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::Processing {
            return Err(CheckoutError::UnexpectedStage {
                expected: "processing".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }

        info!("confirmation wait cancelled by operator");
        self.fail_flow_locked(&mut state, FailureCode::CustomerCancelled);
        Ok(())
    }

    /// Retries a failed payment with the same method and the same frozen
    /// snapshot. The attempt counter goes up by one and the flow re-enters
    /// processing at step 1.
    pub async fn retry_payment(&self) -> CheckoutResult<()> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::Failure {
            return Err(CheckoutError::UnexpectedStage {
                expected: "failure".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }

        state.bump_epoch();
        let epoch = state.epoch;
        let mut attempt = 0;
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.flow.stage = PaymentStage::Processing;
            flow_state.flow.attempt += 1;
            flow_state.flow.error_code = None;
            flow_state.processing_step = 1;
            attempt = flow_state.flow.attempt;
        }
        info!(attempt, "payment retried");
        self.spawn_processing_timer(epoch);
        Ok(())
    }

    /// Abandons the whole checkout at any stage. The flow is destroyed and
    /// the cart keeps its lines. Anything still in flight for this flow is
    /// disowned: a commit response that arrives later is dropped.
    ///
    /// Returns false when there was no flow to cancel.
    pub async fn cancel_checkout(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.flow.is_none() {
            return false;
        }
        state.flow = None;
        state.bump_epoch();
        info!("checkout cancelled, cart kept");
        true
    }

    /// Acknowledges the success screen and moves to the terminal
    /// sale-complete stage.
    pub async fn proceed_to_sale_complete(&self) -> CheckoutResult<()> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_mut().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::Success {
            return Err(CheckoutError::UnexpectedStage {
                expected: "success".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }
        flow_state.flow.stage = PaymentStage::SaleComplete;
        state.bump_epoch();
        Ok(())
    }

    /// Closes out a completed sale: the flow is destroyed and the entry
    /// point is returned so the caller can put the matching tab back in
    /// front. The sale record stays readable until the next checkout starts.
    pub async fn finish_sale(&self) -> CheckoutResult<EntryPoint> {
        let mut state = self.state.lock().await;
        let flow_state = state.flow.as_ref().ok_or(CheckoutError::NoActiveFlow)?;
        if flow_state.flow.stage != PaymentStage::SaleComplete {
            return Err(CheckoutError::UnexpectedStage {
                expected: "sale_complete".into(),
                actual: flow_state.flow.stage.to_string(),
            });
        }
        let entry = flow_state.flow.entry_point.clone();
        state.flow = None;
        state.bump_epoch();
        info!(entry = %entry, "sale finished");
        Ok(entry)
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Walks the confirmation progress: one step per interval up to the final
    /// step, a short pause, then the commit. Dies silently the moment the
    /// epoch moves on.
    fn spawn_processing_timer(&self, epoch: u64) {
        let engine = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(engine.step_interval).await;
                let mut state = engine.state.lock().await;
                if state.epoch != epoch {
                    return;
                }
                let flow_state = match state.flow.as_mut() {
                    Some(flow_state) if flow_state.flow.stage == PaymentStage::Processing => {
                        flow_state
                    }
                    _ => return,
                };
                if flow_state.processing_step < FINAL_CONFIRMATION_STEP {
                    flow_state.processing_step += 1;
                    debug!(step = flow_state.processing_step, "confirmation step advanced");
                }
                if flow_state.processing_step >= FINAL_CONFIRMATION_STEP {
                    break;
                }
            }

            tokio::time::sleep(engine.completion_delay).await;
            let mut state = engine.state.lock().await;
            if state.epoch != epoch {
                return;
            }
            let still_processing = state
                .flow
                .as_ref()
                .map(|flow_state| flow_state.flow.stage == PaymentStage::Processing)
                .unwrap_or(false);
            if !still_processing {
                return;
            }
            engine.trigger_commit_locked(&mut state);
        });
    }

    // =========================================================================
    // Commit Pipeline
    // =========================================================================

    /// Freezes the cart (first trigger only), marks the commit in flight,
    /// and spawns the backend call. Caller holds the lock.
    fn trigger_commit_locked(&self, state: &mut EngineState) {
        let (entry, method, needs_snapshot) = match state.flow.as_ref() {
            Some(flow_state) if !flow_state.commit_in_flight => match flow_state.flow.method {
                Some(method) => (
                    flow_state.flow.entry_point.clone(),
                    method,
                    flow_state.snapshot.is_none(),
                ),
                None => return,
            },
            _ => return,
        };

        if needs_snapshot {
            let frozen = state
                .register
                .cart(&entry)
                .map(|cart| cart.snapshot())
                .unwrap_or_default();
            debug!(lines = frozen.lines.len(), "cart frozen for commit");
            if let Some(flow_state) = state.flow.as_mut() {
                flow_state.snapshot = Some(frozen);
            }
        }

        let snapshot = match state.flow.as_ref().and_then(|fs| fs.snapshot.clone()) {
            Some(snapshot) => snapshot,
            None => return,
        };
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.commit_in_flight = true;
        }

        let commit_epoch = state.epoch;
        let engine = self.clone();
        tokio::spawn(async move {
            let outcome = engine.commit.commit_sale(&snapshot, method).await;
            engine
                .apply_commit_outcome(commit_epoch, snapshot, method, outcome)
                .await;
        });
    }

    /// Applies the backend's answer, unless the flow has moved on since the
    /// commit was spawned.
    async fn apply_commit_outcome(
        &self,
        commit_epoch: u64,
        snapshot: CartSnapshot,
        method: PaymentMethod,
        outcome: CheckoutResult<CommitOutcome>,
    ) {
        let mut state = self.state.lock().await;
        if state.epoch != commit_epoch {
            warn!("commit response arrived for an abandoned checkout, dropped");
            return;
        }
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.commit_in_flight = false;
        }

        match outcome {
            Ok(CommitOutcome::Accepted) => {
                self.apply_accepted_sale(&mut state, &snapshot, method);

                // reconcile the optimistic decrement with the real ledger
                let engine = self.clone();
                tokio::spawn(async move {
                    if let Err(err) = engine.refresh_catalog().await {
                        warn!(error = %err, "post-sale catalog refresh failed");
                    }
                });
            }
            Ok(CommitOutcome::Declined(reason)) => {
                let code = reason.failure_code();
                warn!(code = code.as_str(), "sale commit declined");
                self.fail_flow_locked(&mut state, code);
            }
            Err(err) => {
                warn!(error = %err, "sale commit failed in transport");
                self.fail_flow_locked(&mut state, FailureCode::BackendFailed);
            }
        }
    }

    /// Builds the sale record, applies the sale to the till, and parks the
    /// flow at the success stage. Caller holds the lock.
    fn apply_accepted_sale(
        &self,
        state: &mut EngineState,
        snapshot: &CartSnapshot,
        method: PaymentMethod,
    ) {
        let (entry, reference_id, attempt, phone) = match state.flow.as_ref() {
            Some(flow_state) => (
                flow_state.flow.entry_point.clone(),
                flow_state.flow.reference_id.clone(),
                flow_state.flow.attempt,
                flow_state.flow.phone_number.clone(),
            ),
            None => return,
        };

        // receipt lines read stock before the decrement below
        let lines = state.register.build_sale_lines(snapshot);
        let total_cents: i64 = lines.iter().map(|line| line.line_total_cents).sum();
        let label = state.register.sale_label(&entry);

        let (mpesa_code, phone_number) = if method == PaymentMethod::Mpesa {
            (Some(generate_mpesa_code()), phone)
        } else {
            (None, None)
        };

        let record = SaleRecord {
            reference_id,
            entry_point: entry.clone(),
            label,
            method,
            total_cents,
            completed_at: Utc::now(),
            attempt,
            lines,
            mpesa_code,
            phone_number,
        };
        info!(
            reference_id = %record.reference_id,
            total_cents,
            method = method.label(),
            "sale committed"
        );

        state.register.apply_committed_sale(&entry, snapshot);
        state.last_sale = Some(record);
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.flow.stage = PaymentStage::Success;
            flow_state.flow.error_code = None;
            flow_state.processing_step = 0;
        }
        state.bump_epoch();
    }

    /// Moves the flow to the failure stage with a code. Caller holds the
    /// lock.
    fn fail_flow_locked(&self, state: &mut EngineState, code: FailureCode) {
        if let Some(flow_state) = state.flow.as_mut() {
            flow_state.flow.stage = PaymentStage::Failure;
            flow_state.flow.error_code = Some(code);
            flow_state.processing_step = 0;
        }
        state.bump_epoch();
    }
}

// =============================================================================
// Identifier Generation
// =============================================================================

/// Six-digit transaction reference, "TXN-483920".
fn generate_reference_id() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let seed = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    format!("TXN-{}", 100_000 + seed % 900_000)
}

/// Ten-character M-Pesa style confirmation code. The alphabet skips the
/// lookalikes 0/O, 1/I.
fn generate_mpesa_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let bytes = *Uuid::new_v4().as_bytes();
    bytes
        .iter()
        .take(10)
        .map(|byte| ALPHABET[*byte as usize % ALPHABET.len()] as char)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
