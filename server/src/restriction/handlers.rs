//! API handlers for content restriction checks.
//!
//! Every handler loads its own [`SiteSnapshot`] and runs the core service
//! on it. Nothing is cached between requests.

use axum::extract::{Path, State};
use axum::Json;
use cr_core::{
    AccessDecision, Collaborators, ContentRestriction, NodeId, RenderContext, RestrictionConfig,
    SiteSnapshot,
};
use tracing::warn;

use super::error::{ApiError, ApiResult};
use super::loader::SnapshotQuery;
use super::types::{
    parse_node_id, validate_node, CheckRequest, EvaluateRequest, FeedbackRequest,
    FeedbackResponse, MenuFilterRequest, MenuFilterResponse, RenderRequest, RestrictionResponse,
};
use crate::api::AppState;

fn service<'a>(
    snapshot: &'a SiteSnapshot,
    config: &'a RestrictionConfig,
) -> ContentRestriction<'a> {
    ContentRestriction::new(Collaborators::from_site(snapshot), config)
}

/// Denial issued when the restriction state of `node` cannot be loaded.
fn fail_closed(config: &RestrictionConfig, node: NodeId) -> AccessDecision {
    let empty = SiteSnapshot::new();
    service(&empty, config).unavailable(node)
}

/// Restriction governing a node, own or inherited.
///
/// GET /api/nodes/{node_id}/restriction
pub async fn get_restriction(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> ApiResult<Json<RestrictionResponse>> {
    let node = parse_node_id(&node_id)?;
    let config = &state.config.restriction;

    let snapshot = SnapshotQuery::new()
        .node(node)
        .load(&state.db, config)
        .await?;

    let restriction = service(&snapshot, config).is_restricted(node).map_err(|e| {
        warn!(node = %node, error = %e, "Restriction lookup failed");
        ApiError::Unavailable
    })?;

    Ok(Json(RestrictionResponse::new(node, restriction)))
}

/// Resolve and evaluate access to a node.
///
/// POST /api/access/check
pub async fn check_access(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> ApiResult<Json<AccessDecision>> {
    let node = validate_node(req.node_id)?;
    let config = &state.config.restriction;

    if req.viewer.can_moderate {
        return Ok(Json(AccessDecision::allow()));
    }

    let snapshot = match SnapshotQuery::new()
        .node(node)
        .viewer(&req.viewer)
        .load(&state.db, config)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(node = %node, error = %e, "Snapshot load failed, denying access");
            return Ok(Json(fail_closed(config, node)));
        }
    };

    Ok(Json(service(&snapshot, config).check_node(req.viewer, node)))
}

/// Evaluate access against a rule supplied by the host.
///
/// POST /api/access/evaluate
pub async fn evaluate_access(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> ApiResult<Json<AccessDecision>> {
    let node = req.node_id.map(validate_node).transpose()?;
    let config = &state.config.restriction;
    let products = req
        .rule
        .as_ref()
        .map(|rule| rule.product_ids().to_vec())
        .unwrap_or_default();

    let snapshot = SnapshotQuery::new()
        .viewer(&req.viewer)
        .products(products)
        .load(&state.db, config)
        .await?;

    Ok(Json(service(&snapshot, config).user_can_access(
        req.viewer,
        req.rule.as_ref(),
        node,
    )))
}

/// Run the render filter chain over one piece of output.
///
/// POST /api/render
pub async fn render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> ApiResult<Json<RenderContext>> {
    let nodes = req
        .target
        .node_ids()
        .into_iter()
        .map(validate_node)
        .collect::<ApiResult<Vec<_>>>()?;
    let config = &state.config.restriction;

    let mut ctx = RenderContext::new(req.viewer, req.target, req.content);
    ctx.visible = req.visible;

    if req.viewer.can_moderate {
        let empty = SiteSnapshot::new();
        return Ok(Json(state.filters.run(ctx, &service(&empty, config))));
    }

    match SnapshotQuery::new()
        .nodes(nodes)
        .viewer(&req.viewer)
        .load(&state.db, config)
        .await
    {
        Ok(snapshot) => Ok(Json(state.filters.run(ctx, &service(&snapshot, config)))),
        Err(e) => {
            warn!(render_target = ?ctx.target, error = %e, "Snapshot load failed, gating output");
            Ok(Json(gate_unavailable(config, ctx)))
        }
    }
}

/// Gate output whose restriction state is unknown. Moderators see it as is.
fn gate_unavailable(config: &RestrictionConfig, mut ctx: RenderContext) -> RenderContext {
    if ctx.viewer.can_moderate {
        return ctx;
    }

    let decision = fail_closed(config, ctx.target.governing_node());
    if ctx.target.carries_content() {
        ctx.content = decision.message_or_empty().to_string();
    } else {
        ctx.visible = false;
    }
    ctx.decision = Some(decision);
    ctx
}

/// Replace host feedback text on restricted forum pages.
///
/// POST /api/forum/feedback
pub async fn forum_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    let node = validate_node(req.node_id)?;
    let config = &state.config.restriction;

    if req.viewer.can_moderate {
        return Ok(Json(FeedbackResponse {
            text: req.text,
            overridden: false,
        }));
    }

    let snapshot = SnapshotQuery::new()
        .node(node)
        .viewer(&req.viewer)
        .load(&state.db, config)
        .await?;

    let replacement = snapshot.forum_context(node).and_then(|ctx| {
        service(&snapshot, config).feedback_override(req.viewer, req.page, &ctx, &req.text)
    });

    Ok(Json(match replacement {
        Some(text) => FeedbackResponse {
            text: text.to_string(),
            overridden: true,
        },
        None => FeedbackResponse {
            text: req.text,
            overridden: false,
        },
    }))
}

/// Remove menu items the viewer cannot access.
///
/// POST /api/menus/filter
pub async fn filter_menu(
    State(state): State<AppState>,
    Json(req): Json<MenuFilterRequest>,
) -> ApiResult<Json<MenuFilterResponse>> {
    let config = &state.config.restriction;
    if !config.hide_menu_items || req.viewer.can_moderate {
        return Ok(Json(MenuFilterResponse { items: req.items }));
    }

    let nodes = req
        .items
        .iter()
        .filter_map(|item| item.object_id)
        .map(validate_node)
        .collect::<ApiResult<Vec<_>>>()?;

    let snapshot = SnapshotQuery::new()
        .nodes(nodes)
        .viewer(&req.viewer)
        .load(&state.db, config)
        .await?;

    let items = service(&snapshot, config).filter_menu_items(req.viewer, req.items);
    Ok(Json(MenuFilterResponse { items }))
}
