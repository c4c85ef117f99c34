//! Request-time authentication decision.
//!
//! The gate runs an ordered list of [`GateStep`]s over a [`GateRequest`]:
//! route classification, bearer extraction, token validation, identity
//! attachment. Each step receives the context built so far and returns it
//! together with a [`Decision`]; the first step that accepts or rejects ends
//! the run. Nothing here depends on an HTTP framework.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::identity::AuthResult;
use crate::identity::FailureKind;
use crate::identity::Identity;
use crate::identity::Principal;
use crate::jwt::TokenValidator;

const BEARER_SCHEME: &str = "bearer";

/// Whether a route needs a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RoutePattern {
    Exact(String),
    /// `/base/**`: the base path and everything below it.
    Subtree(String),
}

impl RoutePattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(base) => RoutePattern::Subtree(base.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => path == exact,
            RoutePattern::Subtree(base) => {
                path == base
                    || path
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Explicit table of public route patterns. Anything not listed is protected.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    public: Vec<RoutePattern>,
}

impl RouteTable {
    /// Empty table: every route is protected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `pattern` as public. A trailing `/**` matches a whole subtree.
    pub fn permit(mut self, pattern: &str) -> Self {
        self.public.push(RoutePattern::parse(pattern));
        self
    }

    /// Classify a request path.
    ///
    /// Paths with `.` or `..` segments are never public, so a public prefix
    /// cannot be used to reach a protected route.
    pub fn classify(&self, path: &str) -> RouteClass {
        if path.split('/').any(|segment| segment == "." || segment == "..") {
            return RouteClass::Protected;
        }

        if self.public.iter().any(|pattern| pattern.matches(path)) {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }
}

/// The parts of an inbound request the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub path: &'a str,
    /// `Authorization` header value, `None` if absent or not valid UTF-8
    pub authorization: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// State accumulated while the steps run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateContext {
    pub route: Option<RouteClass>,
    pub token: Option<String>,
    pub identity: Option<Identity>,
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Accept(Principal),
    Reject(FailureKind),
}

/// One stage of the gate.
pub trait GateStep: Send + Sync {
    fn apply(&self, request: &GateRequest<'_>, context: GateContext) -> (GateContext, Decision);
}

/// Accepts public routes anonymously.
pub struct ClassifyRoute {
    routes: RouteTable,
}

impl ClassifyRoute {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }
}

impl GateStep for ClassifyRoute {
    fn apply(
        &self,
        request: &GateRequest<'_>,
        mut context: GateContext,
    ) -> (GateContext, Decision) {
        let route = self.routes.classify(request.path);
        context.route = Some(route);

        match route {
            RouteClass::Public => (context, Decision::Accept(Principal::Anonymous)),
            RouteClass::Protected => (context, Decision::Continue),
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub struct ExtractBearer;

impl GateStep for ExtractBearer {
    fn apply(
        &self,
        request: &GateRequest<'_>,
        mut context: GateContext,
    ) -> (GateContext, Decision) {
        let Some(token) = request.authorization.and_then(bearer_token) else {
            return (context, Decision::Reject(FailureKind::MissingToken));
        };

        if token.is_empty() {
            return (context, Decision::Reject(FailureKind::Malformed));
        }

        context.token = Some(token.to_string());
        (context, Decision::Continue)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = match header.split_once(' ') {
        Some(parts) => parts,
        None => (header, ""),
    };

    if scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        Some(token.trim())
    } else {
        None
    }
}

/// Verifies the extracted token.
pub struct ValidateToken {
    validator: Arc<TokenValidator>,
}

impl ValidateToken {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl GateStep for ValidateToken {
    fn apply(
        &self,
        request: &GateRequest<'_>,
        mut context: GateContext,
    ) -> (GateContext, Decision) {
        let Some(token) = context.token.as_deref() else {
            return (context, Decision::Reject(FailureKind::MissingToken));
        };

        match self.validator.validate(token, request.now) {
            Ok(identity) => {
                context.identity = Some(identity);
                (context, Decision::Continue)
            }
            Err(kind) => (context, Decision::Reject(kind)),
        }
    }
}

/// Accepts the request as the validated identity.
pub struct AttachIdentity;

impl GateStep for AttachIdentity {
    fn apply(
        &self,
        _request: &GateRequest<'_>,
        mut context: GateContext,
    ) -> (GateContext, Decision) {
        match context.identity.take() {
            Some(identity) => (context, Decision::Accept(Principal::User(identity))),
            None => (context, Decision::Reject(FailureKind::MissingToken)),
        }
    }
}

/// Per-request authentication middleware core.
pub struct AuthenticationGate {
    steps: Vec<Box<dyn GateStep>>,
}

impl AuthenticationGate {
    /// Standard pipeline: classify, extract, validate, attach.
    pub fn new(routes: RouteTable, validator: Arc<TokenValidator>) -> Self {
        Self::with_steps(vec![
            Box::new(ClassifyRoute::new(routes)),
            Box::new(ExtractBearer),
            Box::new(ValidateToken::new(validator)),
            Box::new(AttachIdentity),
        ])
    }

    pub fn with_steps(steps: Vec<Box<dyn GateStep>>) -> Self {
        Self { steps }
    }

    /// Run the pipeline. A run that ends without a decision is rejected.
    pub fn evaluate(&self, request: &GateRequest<'_>) -> AuthResult {
        let mut context = GateContext::default();

        for step in &self.steps {
            let (next, decision) = step.apply(request, context);
            context = next;

            match decision {
                Decision::Continue => {}
                Decision::Accept(principal) => return AuthResult::Authenticated(principal),
                Decision::Reject(kind) => return AuthResult::Rejected(kind),
            }
        }

        tracing::error!(path = request.path, "Authentication pipeline made no decision");
        AuthResult::Rejected(FailureKind::MissingToken)
    }
}
