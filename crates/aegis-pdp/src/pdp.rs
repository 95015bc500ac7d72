use std::sync::{Arc, Mutex, MutexGuard};

use aegis_core::error::AccessError;
use aegis_core::policy::{Action, Decision};
use aegis_json::JsonView;
use aegis_pap::Pap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eval::Evaluator;
use crate::obligation::resolve_obligation;
use crate::pip::Pip;
use crate::window::validity_window;

#[derive(Debug, Error)]
pub enum PdpError {
    #[error("request is empty or not valid JSON: {0}")]
    BadRequest(String),

    #[error("request has no policy_id")]
    MissingPolicyId,

    #[error("policy unavailable: {0}")]
    PolicyUnavailable(#[from] AccessError),

    #[error("stored policy is not valid JSON: {0}")]
    MalformedPolicy(String),
}

/// Result of a `decide` call. `action` is present on GRANT (possibly with an
/// empty name); `obligation` is present when the matching obligation subtree
/// resolved to a leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub action: Option<Action>,
    pub obligation: Option<String>,
}

/// Policy Decision Point.
///
/// One mutex guards `decide` end to end, PAP and PIP calls included. The
/// only lock ordering in the system is PDP → PAP.
pub struct Pdp {
    pap: Arc<Pap>,
    pip: Arc<dyn Pip>,
    lock: Mutex<()>,
}

impl Pdp {
    pub fn new(pap: Arc<Pap>, pip: Arc<dyn Pip>) -> Self {
        Self {
            pap,
            pip,
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Evaluate a request against its policy.
    ///
    /// The request names its policy by content address; the policy is
    /// fetched (and integrity-checked) through the PAP, then the grant and
    /// deny trees are evaluated and combined as `goc + 2·doc`.
    pub fn decide(&self, request: &[u8]) -> Result<DecisionOutcome, PdpError> {
        if request.is_empty() {
            return Err(PdpError::BadRequest("empty request".into()));
        }

        let _guard = self.guard();

        let request_view =
            JsonView::parse(request).map_err(|e| PdpError::BadRequest(e.to_string()))?;
        let id_tok = request_view
            .find_key("policy_id")
            .ok_or(PdpError::MissingPolicyId)?;
        let id_hex = std::str::from_utf8(request_view.token_bytes(id_tok))
            .map_err(|e| PdpError::BadRequest(e.to_string()))?;

        let record = self.pap.get_policy(id_hex)?;
        let view = JsonView::parse(&record.object_bytes)
            .map_err(|e| PdpError::MalformedPolicy(e.to_string()))?;

        let goc_tok = view.find_key("policy_goc");
        let doc_tok = view.find_key("policy_doc");
        if goc_tok.is_none() {
            warn!(policy_id = %record.id, "policy has no policy_goc subtree");
        }
        if doc_tok.is_none() {
            warn!(policy_id = %record.id, "policy has no policy_doc subtree");
        }

        let evaluator = Evaluator::new(&view, self.pip.as_ref());
        let goc = goc_tok.map(|n| evaluator.eval(n)).unwrap_or(false);
        let doc = doc_tok.map(|n| evaluator.eval(n)).unwrap_or(false);
        let decision = Decision::from_flags(goc, doc);
        debug!(policy_id = %record.id, goc, doc, decision = decision.as_u8(), "policy resolved");

        let mut action = None;
        let mut obligation = None;
        match decision {
            Decision::Grant => {
                let mut act = Action {
                    value: action_name(&view).unwrap_or_default(),
                    start_time: 0,
                    stop_time: 0,
                };
                if let Some(goc_node) = goc_tok {
                    let (start, stop) = validity_window(&view, goc_node);
                    act.start_time = start;
                    act.stop_time = stop;
                }
                action = Some(act);
                if let Some(node) = view.find_key("obligation_grant") {
                    obligation = resolve_obligation(&view, &evaluator, node);
                }
            }
            Decision::Deny => {
                if let Some(node) = view.find_key("obligation_deny") {
                    obligation = resolve_obligation(&view, &evaluator, node);
                }
            }
            Decision::Gap | Decision::Conflict => {}
        }

        Ok(DecisionOutcome {
            decision,
            action,
            obligation,
        })
    }
}

/// The nominal action name: the first `"action"` key anywhere in the policy.
fn action_name(view: &JsonView) -> Option<String> {
    let tok = view.find_key("action")?;
    Some(String::from_utf8_lossy(view.token_bytes(tok)).into_owned())
}
