//! Amenity booking handlers.
//!
//! ```text
//! GET    /api/v1/bookings/amenities
//! POST   /api/v1/bookings
//! GET    /api/v1/bookings/my
//! GET    /api/v1/bookings/all
//! PUT    /api/v1/bookings/{id}/status
//! DELETE /api/v1/bookings/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amenity, Booking, BookingStatus, BookingWithOwner, NewBooking};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_instant, parse_status, require_field};

/// Booking creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingDto {
    #[serde(default)]
    pub amenity_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub event_description: Option<String>,
}

/// Status update request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusDto {
    pub status: String,
}

/// Owner display fields joined into admin-facing views.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDto {
    pub name: String,
    pub login_id: String,
}

/// Booking representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: Uuid,
    pub amenity_name: String,
    pub event_description: String,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<OwnerDto>,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            amenity_name: booking.amenity_name,
            event_description: booking.event_description,
            start_time: booking.window.start().to_rfc3339(),
            end_time: booking.window.end().to_rfc3339(),
            status: booking.status,
            booked_by: None,
        }
    }
}

impl From<BookingWithOwner> for BookingDto {
    fn from(joined: BookingWithOwner) -> Self {
        let mut dto = Self::from(joined.booking);
        dto.booked_by = Some(OwnerDto {
            name: joined.owner_name,
            login_id: joined.owner_login_id.into(),
        });
        dto
    }
}

/// The fixed amenity catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/amenities",
    responses((status = 200, description = "Amenities", body = [Amenity])),
    tags = ["bookings"],
    operation_id = "listAmenities"
)]
#[get("/bookings/amenities")]
pub async fn list_amenities(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<&'static [Amenity]>> {
    session.require_resident()?;
    Ok(web::Json(state.bookings.amenities()))
}

/// Create a reservation request.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingDto,
    responses(
        (status = 201, description = "Booking created", body = BookingDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 409, description = "Slot already taken", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingDto>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_resident()?;
    let payload = payload.into_inner();

    let amenity_name = require_field("amenityName", payload.amenity_name.as_deref())?;
    let start = parse_instant(
        "startTime",
        require_field("startTime", payload.start_time.as_deref())?,
    )?;
    let end = parse_instant(
        "endTime",
        require_field("endTime", payload.end_time.as_deref())?,
    )?;

    let booking = state
        .bookings
        .create(
            owner,
            NewBooking {
                amenity_name: amenity_name.to_owned(),
                start,
                end,
                event_description: payload.event_description,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(BookingDto::from(booking)))
}

/// The caller's own bookings.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/my",
    responses((status = 200, description = "Bookings", body = [BookingDto])),
    tags = ["bookings"],
    operation_id = "myBookings"
)]
#[get("/bookings/my")]
pub async fn my_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    let owner = session.require_resident()?;
    let bookings = state.bookings.my_bookings(owner).await?;
    Ok(web::Json(bookings.into_iter().map(Into::into).collect()))
}

/// Every booking, for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/all",
    responses((status = 200, description = "Bookings", body = [BookingDto])),
    tags = ["bookings"],
    operation_id = "allBookings"
)]
#[get("/bookings/all")]
pub async fn all_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    session.require_admin()?;
    let bookings = state.bookings.all_bookings().await?;
    Ok(web::Json(bookings.into_iter().map(Into::into).collect()))
}

/// Admin approves, rejects, or cancels a booking.
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}/status",
    request_body = BookingStatusDto,
    responses(
        (status = 200, description = "Updated booking", body = BookingDto),
        (status = 400, description = "Unknown status", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown booking", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bookings"],
    operation_id = "setBookingStatus"
)]
#[put("/bookings/{id}/status")]
pub async fn set_booking_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<BookingStatusDto>,
) -> ApiResult<web::Json<BookingDto>> {
    session.require_admin()?;
    let status: BookingStatus = parse_status("status", &payload.status)?;
    let booking = state.bookings.set_status(path.into_inner(), status).await?;
    Ok(web::Json(booking.into()))
}

/// Admin removes a booking from the queue entirely.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    responses(
        (status = 200, description = "Booking removed"),
        (status = 404, description = "Unknown booking", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bookings"],
    operation_id = "deleteBooking"
)]
#[delete("/bookings/{id}")]
pub async fn delete_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = path.into_inner();
    state.bookings.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}
