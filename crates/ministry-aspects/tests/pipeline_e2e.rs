//! End-to-end pipeline integration tests.
//!
//! These tests verify that both aspect stages work correctly together, in
//! the proper order, around a terminal call that resolves a spell from the
//! registry and executes it:
//!
//! 1. Authorization - Permission check against the role model
//! 2. Audit - ATTEMPT / SUCCESS / FAILURE records and spell metrics

use ministry_aspects::{
    context::InvocationContext,
    pipeline::{Pipeline, Stage},
    stages::{
        audit::{AuditAspect, AuditTrail},
        authorization::{AuthorizationAspect, AuthorizationResult},
    },
    AspectResult,
};
use ministry_core::{Command, CommandConstructor, CommandRegistry, MinistryError, User};
use ministry_spells::{catalog, AvadaKedavra, ExpectoPatronum, Lumos};
use ministry_telemetry::{
    metrics::{EVENTS_TOTAL, SPELL_CASTS_TOTAL, SPELL_CAST_LATENCY_SECONDS},
    AuditPriority, AuditStatus,
};
use ministry_test::{fixtures, ConstructionCounter, RecordingAuditSink, RecordingMetricsSink};
use std::sync::Arc;

fn constructor<C: Command + Default + 'static>() -> CommandConstructor {
    Arc::new(|| Box::new(C::default()) as Box<dyn Command>)
}

/// Everything a test needs to inspect after running the pipeline.
struct Harness {
    pipeline: Pipeline,
    registry: CommandRegistry,
    audit: Arc<RecordingAuditSink>,
    metrics: Arc<RecordingMetricsSink>,
    constructions: ConstructionCounter,
}

impl Harness {
    fn new() -> Self {
        Self::with_model(Some(Arc::new(catalog::default_permission_model())))
    }

    fn with_model(model: Option<Arc<ministry_core::PermissionModel>>) -> Self {
        let audit = Arc::new(RecordingAuditSink::new());
        let metrics = Arc::new(RecordingMetricsSink::new());
        let constructions = ConstructionCounter::new();

        let mut registry = CommandRegistry::new();
        registry
            .register("Lumos", constructions.wrap(constructor::<Lumos>()))
            .unwrap();
        registry
            .register(
                "Expecto Patronum",
                constructions.wrap(constructor::<ExpectoPatronum>()),
            )
            .unwrap();
        registry
            .register(
                "Avada Kedavra",
                constructions.wrap(constructor::<AvadaKedavra>()),
            )
            .unwrap();

        let pipeline = Pipeline::builder()
            .authorization(AuthorizationAspect::from_optional(model))
            .audit(AuditAspect::new(audit.clone(), metrics.clone()))
            .build();

        Self {
            pipeline,
            registry,
            audit,
            metrics,
            constructions,
        }
    }

    async fn cast(&self, user: User, spell: &str) -> (AspectResult, InvocationContext) {
        let mut ctx = InvocationContext::new(user, "spell:cast", spell)
            .with_detail("request", format!("cast {spell}"));

        let registry = &self.registry;
        let result = self
            .pipeline
            .process(&mut ctx, move |ctx| {
                let command = registry.resolve(ctx.operation_name())?;
                command.execute(ctx.user(), ctx.args())
            })
            .await;

        (result, ctx)
    }
}

// ============================================================================
// Stage order
// ============================================================================

#[tokio::test]
async fn test_pipeline_stage_order() {
    let harness = Harness::new();

    assert_eq!(harness.pipeline.stage_count(), 2);
    assert_eq!(
        harness.pipeline.stage_names(),
        Stage::all().iter().map(|s| s.name()).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_context_carries_both_stage_results() {
    let harness = Harness::new();
    let (result, ctx) = harness.cast(fixtures::harry_potter(), "Lumos").await;

    assert!(result.is_ok());
    assert!(ctx.get_extension::<AuthorizationResult>().unwrap().allowed);
    assert!(ctx.get_extension::<AuditTrail>().unwrap().latency.is_some());
}

// ============================================================================
// Successful casts
// ============================================================================

#[tokio::test]
async fn test_auror_casts_lumos() {
    let harness = Harness::new();
    let (result, _) = harness.cast(fixtures::harry_potter(), "Lumos").await;

    assert_eq!(result.unwrap(), "Wand lit! (Lumos)");
    assert_eq!(
        harness.audit.statuses(),
        vec![AuditStatus::Attempt, AuditStatus::Success]
    );
    assert_eq!(
        harness
            .metrics
            .count(SPELL_CASTS_TOTAL, &[("spell_name", "Lumos"), ("status", "success")]),
        1
    );
    assert_eq!(harness.metrics.event_types(), vec!["spell_success"]);
    assert_eq!(harness.constructions.count(), 1);
}

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let harness = Harness::new();

    for spell in ["Lumos", "lumos", "LUMOS"] {
        let (result, _) = harness.cast(fixtures::harry_potter(), spell).await;
        assert_eq!(result.unwrap(), "Wand lit! (Lumos)");
    }

    // The metric label keeps the name as requested
    assert_eq!(
        harness
            .metrics
            .count(SPELL_CASTS_TOTAL, &[("spell_name", "LUMOS")]),
        1
    );
}

#[tokio::test]
async fn test_ministro_casts_unforgivable() {
    let harness = Harness::new();
    let (result, _) = harness
        .cast(fixtures::hermione_granger(), "Avada Kedavra")
        .await;

    assert!(!result.unwrap().is_empty());
    assert_eq!(harness.metrics.status_labels(SPELL_CASTS_TOTAL), vec!["success"]);
}

// ============================================================================
// Authorization rejections
// ============================================================================

#[tokio::test]
async fn test_funcionario_is_denied_before_construction() {
    let harness = Harness::new();
    let (result, ctx) = harness.cast(fixtures::percy_weasley(), "Lumos").await;

    match result.unwrap_err() {
        MinistryError::PermissionDenied {
            username,
            required_permission,
        } => {
            assert_eq!(username, "percy_weasley");
            assert_eq!(required_permission, "spell:cast");
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }

    assert_eq!(harness.constructions.count(), 0);
    assert!(!ctx.get_extension::<AuthorizationResult>().unwrap().allowed);

    // Rejection is still audited once, without an ATTEMPT
    let records = harness.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AuditStatus::Failure);
    assert_eq!(records[0].details["stage"], "authorization");

    assert_eq!(
        harness.metrics.status_labels(SPELL_CASTS_TOTAL),
        vec!["fail_security"]
    );
    assert_eq!(harness.metrics.event_types(), vec!["security_fail"]);
}

#[tokio::test]
async fn test_unknown_role_is_denied() {
    let harness = Harness::new();
    let (result, _) = harness.cast(fixtures::muggle(), "Lumos").await;

    assert!(matches!(result, Err(MinistryError::PermissionDenied { .. })));
    assert_eq!(harness.constructions.count(), 0);
}

#[tokio::test]
async fn test_missing_model_fails_closed_for_everyone() {
    let harness = Harness::with_model(None);

    for user in [fixtures::harry_potter(), fixtures::hermione_granger()] {
        let (result, _) = harness.cast(user, "Lumos").await;
        assert!(matches!(result, Err(MinistryError::PermissionDenied { .. })));
    }
    assert_eq!(harness.constructions.count(), 0);
}

// ============================================================================
// Failures inside the call
// ============================================================================

#[tokio::test]
async fn test_auror_unforgivable_is_forbidden() {
    let harness = Harness::new();
    let (result, _) = harness
        .cast(fixtures::harry_potter(), "Avada Kedavra")
        .await;

    assert!(matches!(
        result,
        Err(MinistryError::ForbiddenOperation { .. })
    ));
    assert_eq!(harness.constructions.count(), 1);

    let records = harness.audit.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].status, AuditStatus::Failure);
    assert_eq!(records[1].priority, AuditPriority::High);

    assert_eq!(
        harness.metrics.status_labels(SPELL_CASTS_TOTAL),
        vec!["fail_security"]
    );
    assert_eq!(
        harness.metrics.count(EVENTS_TOTAL, &[("event_type", "security_fail")]),
        1
    );
}

#[tokio::test]
async fn test_unknown_spell_is_a_logic_failure() {
    let harness = Harness::new();
    let (result, _) = harness.cast(fixtures::harry_potter(), "Nonexistens").await;

    match result.unwrap_err() {
        MinistryError::CommandNotFound { requested_name } => {
            assert_eq!(requested_name, "Nonexistens");
        }
        other => panic!("expected CommandNotFound, got {other:?}"),
    }
    assert_eq!(harness.constructions.count(), 0);

    assert_eq!(
        harness.audit.statuses(),
        vec![AuditStatus::Attempt, AuditStatus::Failure]
    );
    assert_eq!(harness.metrics.status_labels(SPELL_CASTS_TOTAL), vec!["fail_logic"]);
    assert_eq!(harness.metrics.event_types(), vec!["spell_fail"]);
    assert_eq!(
        harness
            .metrics
            .observations_of(SPELL_CAST_LATENCY_SECONDS)
            .len(),
        1
    );
}

// ============================================================================
// Audit invariants
// ============================================================================

#[tokio::test]
async fn test_each_authorized_call_gets_one_attempt_and_one_terminal() {
    let harness = Harness::new();
    let calls = [
        (fixtures::harry_potter(), "Lumos"),
        (fixtures::harry_potter(), "Expecto Patronum"),
        (fixtures::harry_potter(), "Avada Kedavra"),
        (fixtures::hermione_granger(), "Avada Kedavra"),
        (fixtures::hermione_granger(), "Nonexistens"),
    ];

    for (user, spell) in calls {
        let (_, ctx) = harness.cast(user, spell).await;
        let id = ctx.invocation_id();

        let records: Vec<_> = harness
            .audit
            .records()
            .into_iter()
            .filter(|r| r.invocation_id == id)
            .collect();

        assert_eq!(records.len(), 2, "{spell}");
        assert_eq!(records[0].status, AuditStatus::Attempt);
        assert!(records[1].status.is_terminal());
        assert_eq!(records[0].details["spell"], spell);
    }

    assert_eq!(harness.audit.len(), 10);
    assert_eq!(
        harness
            .metrics
            .observations_of(SPELL_CAST_LATENCY_SECONDS)
            .len(),
        5
    );
}

#[tokio::test]
async fn test_degraded_audit_still_casts() {
    let metrics = Arc::new(RecordingMetricsSink::new());
    let registry = catalog::default_registry().unwrap();
    let pipeline = Pipeline::builder()
        .authorization(AuthorizationAspect::new(Arc::new(
            catalog::default_permission_model(),
        )))
        .audit(AuditAspect::without_sink(metrics.clone()))
        .build();

    let mut ctx = InvocationContext::new(fixtures::harry_potter(), "spell:cast", "Lumos");
    let result = pipeline
        .process(&mut ctx, |ctx| {
            registry
                .resolve(ctx.operation_name())?
                .execute(ctx.user(), ctx.args())
        })
        .await;

    assert_eq!(result.unwrap(), "Wand lit! (Lumos)");
    assert!(metrics.is_empty());
    assert!(ctx.get_extension::<AuditTrail>().unwrap().degraded);
}
