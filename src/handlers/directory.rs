//! Team, board, trader, broker, partner, publication, career and commodity
//! listings. Public reads go through the `list_*` handlers that pin the status to
//! live records; the CMS reads everything through `/api/cms/...`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::ApiError,
    extract::JsonBody,
    handlers::MessageResponse,
    models::{
        Paginated, Validate,
        directory::{
            BoardMember, BoardMemberInput, Broker, BrokerInput, Career, CareerInput, Commodity,
            CommodityInput, DirectoryFilter, DirectoryQuery, Partner, PartnerInput, Publication,
            PublicationInput, ReorderRequest, TeamMember, TeamMemberInput, Trader, TraderInput,
        },
    },
};

const ACTIVE_PARTNER: &str = "active";
const PUBLISHED: &str = "published";
const OPEN_CAREER: &str = "Open";

fn check_reorder(request: &ReorderRequest) -> Result<(), ApiError> {
    if request.members.is_empty() {
        return Err(ApiError::Validation("members is required".to_string()));
    }
    Ok(())
}

fn deleted(entity: &str) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("{entity} deleted successfully")))
}

// --- Team members ---

/// list_team_members
///
/// [Public Route] Ordered by `order_index`; filter with `type` and `search`.
#[utoipa::path(
    get,
    path = "/api/team-members",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Team members", body = Paginated<TeamMember>))
)]
pub async fn list_team_members(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<TeamMember>>, ApiError> {
    Ok(Json(state.repo.list_team_members(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/team-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Team member id")),
    responses(
        (status = 200, description = "Team member", body = TeamMember),
        (status = 404, description = "Team member not found")
    )
)]
pub async fn get_team_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TeamMember>, ApiError> {
    let member = state
        .repo
        .get_team_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team member"))?;
    Ok(Json(member))
}

/// create_team_member
///
/// [Content Route] Without `order_index` the member is placed last within its type.
#[utoipa::path(
    post,
    path = "/api/team-members",
    tag = "directory",
    request_body = TeamMemberInput,
    responses(
        (status = 201, description = "Team member created", body = TeamMember),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_team_member(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TeamMemberInput>,
) -> Result<(StatusCode, Json<TeamMember>), ApiError> {
    payload.validate()?;
    let member = state.repo.create_team_member(&payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/team-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Team member id")),
    request_body = TeamMemberInput,
    responses(
        (status = 200, description = "Team member updated", body = TeamMember),
        (status = 404, description = "Team member not found")
    )
)]
pub async fn update_team_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<TeamMemberInput>,
) -> Result<Json<TeamMember>, ApiError> {
    payload.validate()?;
    let member = state
        .repo
        .update_team_member(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Team member"))?;
    Ok(Json(member))
}

#[utoipa::path(
    delete,
    path = "/api/team-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Team member id")),
    responses(
        (status = 200, description = "Team member deleted", body = MessageResponse),
        (status = 404, description = "Team member not found")
    )
)]
pub async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_team_member(id).await? {
        return Err(ApiError::not_found("Team member"));
    }
    Ok(deleted("Team member"))
}

/// reorder_team_members
///
/// [Content Route] Applies every position or none; one unknown id fails the call.
#[utoipa::path(
    put,
    path = "/api/team-members/reorder",
    tag = "directory",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Order saved", body = MessageResponse),
        (status = 404, description = "A member id does not exist")
    )
)]
pub async fn reorder_team_members(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReorderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_reorder(&payload)?;
    state.repo.reorder_team_members(&payload.members).await?;
    Ok(Json(MessageResponse::new("Team members reordered successfully")))
}

// --- Board members ---

/// list_board_members
///
/// [Authenticated Route]
#[utoipa::path(
    get,
    path = "/api/board-members",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Board members", body = Paginated<BoardMember>))
)]
pub async fn list_board_members(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<BoardMember>>, ApiError> {
    Ok(Json(state.repo.list_board_members(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/board-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Board member id")),
    responses(
        (status = 200, description = "Board member", body = BoardMember),
        (status = 404, description = "Board member not found")
    )
)]
pub async fn get_board_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BoardMember>, ApiError> {
    let member = state
        .repo
        .get_board_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board member"))?;
    Ok(Json(member))
}

#[utoipa::path(
    post,
    path = "/api/board-members",
    tag = "directory",
    request_body = BoardMemberInput,
    responses(
        (status = 201, description = "Board member created", body = BoardMember),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_board_member(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BoardMemberInput>,
) -> Result<(StatusCode, Json<BoardMember>), ApiError> {
    payload.validate()?;
    let member = state.repo.create_board_member(&payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/board-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Board member id")),
    request_body = BoardMemberInput,
    responses(
        (status = 200, description = "Board member updated", body = BoardMember),
        (status = 404, description = "Board member not found")
    )
)]
pub async fn update_board_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<BoardMemberInput>,
) -> Result<Json<BoardMember>, ApiError> {
    payload.validate()?;
    let member = state
        .repo
        .update_board_member(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Board member"))?;
    Ok(Json(member))
}

#[utoipa::path(
    delete,
    path = "/api/board-members/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Board member id")),
    responses(
        (status = 200, description = "Board member deleted", body = MessageResponse),
        (status = 404, description = "Board member not found")
    )
)]
pub async fn delete_board_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_board_member(id).await? {
        return Err(ApiError::not_found("Board member"));
    }
    Ok(deleted("Board member"))
}

#[utoipa::path(
    put,
    path = "/api/board-members/reorder",
    tag = "directory",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Order saved", body = MessageResponse),
        (status = 404, description = "A member id does not exist")
    )
)]
pub async fn reorder_board_members(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReorderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_reorder(&payload)?;
    state.repo.reorder_board_members(&payload.members).await?;
    Ok(Json(MessageResponse::new("Board members reordered successfully")))
}

// --- Traders ---

/// list_traders
///
/// [Public Route] Filters: `member_type`, `status`, `search`.
#[utoipa::path(
    get,
    path = "/api/traders",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Traders", body = Paginated<Trader>))
)]
pub async fn list_traders(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Trader>>, ApiError> {
    Ok(Json(state.repo.list_traders(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/traders/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Trader id")),
    responses(
        (status = 200, description = "Trader", body = Trader),
        (status = 404, description = "Trader not found")
    )
)]
pub async fn get_trader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Trader>, ApiError> {
    let trader = state
        .repo
        .get_trader(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Trader"))?;
    Ok(Json(trader))
}

#[utoipa::path(
    post,
    path = "/api/traders",
    tag = "directory",
    request_body = TraderInput,
    responses(
        (status = 201, description = "Trader created", body = Trader),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_trader(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TraderInput>,
) -> Result<(StatusCode, Json<Trader>), ApiError> {
    payload.validate()?;
    let trader = state.repo.create_trader(&payload).await?;
    Ok((StatusCode::CREATED, Json(trader)))
}

#[utoipa::path(
    put,
    path = "/api/traders/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Trader id")),
    request_body = TraderInput,
    responses(
        (status = 200, description = "Trader updated", body = Trader),
        (status = 404, description = "Trader not found")
    )
)]
pub async fn update_trader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<TraderInput>,
) -> Result<Json<Trader>, ApiError> {
    payload.validate()?;
    let trader = state
        .repo
        .update_trader(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Trader"))?;
    Ok(Json(trader))
}

#[utoipa::path(
    delete,
    path = "/api/traders/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Trader id")),
    responses(
        (status = 200, description = "Trader deleted", body = MessageResponse),
        (status = 404, description = "Trader not found")
    )
)]
pub async fn delete_trader(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_trader(id).await? {
        return Err(ApiError::not_found("Trader"));
    }
    Ok(deleted("Trader"))
}

// --- Brokers ---

/// list_brokers
///
/// [Public Route] Filters: `specialization`, `status`, `search`.
#[utoipa::path(
    get,
    path = "/api/brokers",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Brokers", body = Paginated<Broker>))
)]
pub async fn list_brokers(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Broker>>, ApiError> {
    Ok(Json(state.repo.list_brokers(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/brokers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Broker id")),
    responses(
        (status = 200, description = "Broker", body = Broker),
        (status = 404, description = "Broker not found")
    )
)]
pub async fn get_broker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Broker>, ApiError> {
    let broker = state
        .repo
        .get_broker(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Broker"))?;
    Ok(Json(broker))
}

#[utoipa::path(
    post,
    path = "/api/brokers",
    tag = "directory",
    request_body = BrokerInput,
    responses(
        (status = 201, description = "Broker created", body = Broker),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_broker(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BrokerInput>,
) -> Result<(StatusCode, Json<Broker>), ApiError> {
    payload.validate()?;
    let broker = state.repo.create_broker(&payload).await?;
    Ok((StatusCode::CREATED, Json(broker)))
}

#[utoipa::path(
    put,
    path = "/api/brokers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Broker id")),
    request_body = BrokerInput,
    responses(
        (status = 200, description = "Broker updated", body = Broker),
        (status = 404, description = "Broker not found")
    )
)]
pub async fn update_broker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<BrokerInput>,
) -> Result<Json<Broker>, ApiError> {
    payload.validate()?;
    let broker = state
        .repo
        .update_broker(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Broker"))?;
    Ok(Json(broker))
}

#[utoipa::path(
    delete,
    path = "/api/brokers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Broker id")),
    responses(
        (status = 200, description = "Broker deleted", body = MessageResponse),
        (status = 404, description = "Broker not found")
    )
)]
pub async fn delete_broker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_broker(id).await? {
        return Err(ApiError::not_found("Broker"));
    }
    Ok(deleted("Broker"))
}

// --- Partners ---

/// list_active_partners
///
/// [Public Route] Active partners only, whatever `status` the caller passes.
#[utoipa::path(
    get,
    path = "/api/partners",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Active partners", body = Paginated<Partner>))
)]
pub async fn list_active_partners(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Partner>>, ApiError> {
    let filter = DirectoryFilter::from(query).with_status(ACTIVE_PARTNER);
    Ok(Json(state.repo.list_partners(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/partners/category/{category}",
    tag = "directory",
    params(("category" = String, Path, description = "Partner category"), DirectoryQuery),
    responses((status = 200, description = "Active partners in the category", body = Paginated<Partner>))
)]
pub async fn list_partners_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Partner>>, ApiError> {
    let mut filter = DirectoryFilter::from(query).with_status(ACTIVE_PARTNER);
    filter.category = Some(category);
    Ok(Json(state.repo.list_partners(&filter).await?))
}

/// list_all_partners
///
/// [Content Route] Every status.
#[utoipa::path(
    get,
    path = "/api/cms/partners",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Partners", body = Paginated<Partner>))
)]
pub async fn list_all_partners(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Partner>>, ApiError> {
    Ok(Json(state.repo.list_partners(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/partners/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Partner id")),
    responses(
        (status = 200, description = "Partner", body = Partner),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Partner>, ApiError> {
    let partner = state
        .repo
        .get_partner(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner"))?;
    Ok(Json(partner))
}

#[utoipa::path(
    post,
    path = "/api/partners",
    tag = "directory",
    request_body = PartnerInput,
    responses(
        (status = 201, description = "Partner created", body = Partner),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_partner(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PartnerInput>,
) -> Result<(StatusCode, Json<Partner>), ApiError> {
    payload.validate()?;
    let partner = state.repo.create_partner(&payload).await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

#[utoipa::path(
    put,
    path = "/api/partners/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Partner id")),
    request_body = PartnerInput,
    responses(
        (status = 200, description = "Partner updated", body = Partner),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn update_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PartnerInput>,
) -> Result<Json<Partner>, ApiError> {
    payload.validate()?;
    let partner = state
        .repo
        .update_partner(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner"))?;
    Ok(Json(partner))
}

#[utoipa::path(
    delete,
    path = "/api/partners/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Partner id")),
    responses(
        (status = 200, description = "Partner deleted", body = MessageResponse),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn delete_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_partner(id).await? {
        return Err(ApiError::not_found("Partner"));
    }
    Ok(deleted("Partner"))
}

// --- Publications ---

/// list_publications
///
/// [Public Route] Published only, newest publication date first.
#[utoipa::path(
    get,
    path = "/api/publications",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Publications", body = Paginated<Publication>))
)]
pub async fn list_publications(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Publication>>, ApiError> {
    let filter = DirectoryFilter::from(query).with_status(PUBLISHED);
    Ok(Json(state.repo.list_publications(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/cms/publications",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Publications of every status", body = Paginated<Publication>))
)]
pub async fn list_all_publications(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Publication>>, ApiError> {
    Ok(Json(state.repo.list_publications(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/publications/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Publication id")),
    responses(
        (status = 200, description = "Publication", body = Publication),
        (status = 404, description = "Publication not found")
    )
)]
pub async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Publication>, ApiError> {
    let publication = state
        .repo
        .get_publication(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Publication"))?;
    Ok(Json(publication))
}

#[utoipa::path(
    post,
    path = "/api/publications",
    tag = "directory",
    request_body = PublicationInput,
    responses(
        (status = 201, description = "Publication created", body = Publication),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_publication(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PublicationInput>,
) -> Result<(StatusCode, Json<Publication>), ApiError> {
    payload.validate()?;
    let publication = state.repo.create_publication(&payload).await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

#[utoipa::path(
    put,
    path = "/api/publications/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Publication id")),
    request_body = PublicationInput,
    responses(
        (status = 200, description = "Publication updated", body = Publication),
        (status = 404, description = "Publication not found")
    )
)]
pub async fn update_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PublicationInput>,
) -> Result<Json<Publication>, ApiError> {
    payload.validate()?;
    let publication = state
        .repo
        .update_publication(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Publication"))?;
    Ok(Json(publication))
}

#[utoipa::path(
    delete,
    path = "/api/publications/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Publication id")),
    responses(
        (status = 200, description = "Publication deleted", body = MessageResponse),
        (status = 404, description = "Publication not found")
    )
)]
pub async fn delete_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_publication(id).await? {
        return Err(ApiError::not_found("Publication"));
    }
    Ok(deleted("Publication"))
}

// --- Careers ---

/// list_open_careers
///
/// [Public Route] Vacancies with status `Open`.
#[utoipa::path(
    get,
    path = "/api/careers",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Open vacancies", body = Paginated<Career>))
)]
pub async fn list_open_careers(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Career>>, ApiError> {
    let filter = DirectoryFilter::from(query).with_status(OPEN_CAREER);
    Ok(Json(state.repo.list_careers(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/cms/careers",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Vacancies of every status", body = Paginated<Career>))
)]
pub async fn list_all_careers(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Career>>, ApiError> {
    Ok(Json(state.repo.list_careers(&query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/careers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Career id")),
    responses(
        (status = 200, description = "Career", body = Career),
        (status = 404, description = "Career not found")
    )
)]
pub async fn get_career(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Career>, ApiError> {
    let career = state
        .repo
        .get_career(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Career"))?;
    Ok(Json(career))
}

#[utoipa::path(
    post,
    path = "/api/careers",
    tag = "directory",
    request_body = CareerInput,
    responses(
        (status = 201, description = "Career created", body = Career),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_career(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CareerInput>,
) -> Result<(StatusCode, Json<Career>), ApiError> {
    payload.validate()?;
    let career = state.repo.create_career(&payload).await?;
    Ok((StatusCode::CREATED, Json(career)))
}

#[utoipa::path(
    put,
    path = "/api/careers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Career id")),
    request_body = CareerInput,
    responses(
        (status = 200, description = "Career updated", body = Career),
        (status = 404, description = "Career not found")
    )
)]
pub async fn update_career(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<CareerInput>,
) -> Result<Json<Career>, ApiError> {
    payload.validate()?;
    let career = state
        .repo
        .update_career(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Career"))?;
    Ok(Json(career))
}

#[utoipa::path(
    delete,
    path = "/api/careers/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Career id")),
    responses(
        (status = 200, description = "Career deleted", body = MessageResponse),
        (status = 404, description = "Career not found")
    )
)]
pub async fn delete_career(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_career(id).await? {
        return Err(ApiError::not_found("Career"));
    }
    Ok(deleted("Career"))
}

// --- Commodities ---

/// list_active_commodities
///
/// [Public Route] Tradeable commodities, filter with `category` and `search`.
#[utoipa::path(
    get,
    path = "/api/commodities",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "Active commodities", body = Paginated<Commodity>))
)]
pub async fn list_active_commodities(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Commodity>>, ApiError> {
    Ok(Json(
        state.repo.list_commodities(&query.into(), true).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/cms/commodities",
    tag = "directory",
    params(DirectoryQuery),
    responses((status = 200, description = "All commodities", body = Paginated<Commodity>))
)]
pub async fn list_all_commodities(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Paginated<Commodity>>, ApiError> {
    Ok(Json(
        state.repo.list_commodities(&query.into(), false).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/commodities/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Commodity id")),
    responses(
        (status = 200, description = "Commodity", body = Commodity),
        (status = 404, description = "Commodity not found")
    )
)]
pub async fn get_commodity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Commodity>, ApiError> {
    let commodity = state
        .repo
        .get_commodity(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Commodity"))?;
    Ok(Json(commodity))
}

/// create_commodity
///
/// [Content Route] Codes are unique; the price change is derived from the two prices.
#[utoipa::path(
    post,
    path = "/api/commodities",
    tag = "directory",
    request_body = CommodityInput,
    responses(
        (status = 201, description = "Commodity created", body = Commodity),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_commodity(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CommodityInput>,
) -> Result<(StatusCode, Json<Commodity>), ApiError> {
    payload.validate()?;
    let commodity = state.repo.create_commodity(&payload).await?;
    tracing::info!(commodity_id = commodity.id, code = %commodity.code, "commodity created");
    Ok((StatusCode::CREATED, Json(commodity)))
}

#[utoipa::path(
    put,
    path = "/api/commodities/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Commodity id")),
    request_body = CommodityInput,
    responses(
        (status = 200, description = "Commodity updated", body = Commodity),
        (status = 404, description = "Commodity not found"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn update_commodity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<CommodityInput>,
) -> Result<Json<Commodity>, ApiError> {
    payload.validate()?;
    let commodity = state
        .repo
        .update_commodity(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Commodity"))?;
    Ok(Json(commodity))
}

#[utoipa::path(
    delete,
    path = "/api/commodities/{id}",
    tag = "directory",
    params(("id" = i64, Path, description = "Commodity id")),
    responses(
        (status = 200, description = "Commodity deleted", body = MessageResponse),
        (status = 404, description = "Commodity not found")
    )
)]
pub async fn delete_commodity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_commodity(id).await? {
        return Err(ApiError::not_found("Commodity"));
    }
    Ok(deleted("Commodity"))
}
