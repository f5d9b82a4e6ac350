//! # Beacon API Handler
//!
//! Turns facade calls into status + JSON pairs for the HTTP layer: builds
//! the response messages, checks credentials and classifies failures.

use super::types::{error_code_for, ApiResponse, Credentials, ErrorCode};
use crate::domain::errors::StorageError;
use crate::domain::secret::generate_secret;
use crate::ports::inbound::BeaconStorageApi;
use beacon_types::{
    Beacon, Comment, CreateAccountRespMsg, Geotag, LocationMsg, NewComment, PostId, PostMetaMsg,
    PostMsg, RespBeaconMsg, RespCommentMsg, SubmitBeaconMsg, SubmitCommentMsg, Timestamp, UserId,
};
use serde::Serialize;
use std::sync::Arc;

/// Layout of the Unix `date` command, e.g. `Mon Jan  2 15:04:05 UTC 2006`.
pub const UNIX_DATE_FORMAT: &str = "%a %b %e %H:%M:%S UTC %Y";

/// Render a creation timestamp the way clients display it.
///
/// Timestamps beyond chrono's range render as an empty string.
pub fn format_unix_date(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format(UNIX_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// API handler for the beacon storage core.
///
/// Wraps a shared `BeaconStorageApi` implementation; one handler serves
/// every request thread.
pub struct BeaconApiHandler<S: BeaconStorageApi> {
    service: Arc<S>,
}

impl<S: BeaconStorageApi> Clone for BeaconApiHandler<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: BeaconStorageApi> BeaconApiHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Get reference to underlying service
    pub fn service(&self) -> &S {
        &self.service
    }

    // =========================================================================
    // POSTS
    // =========================================================================

    /// Create a beacon for the authenticated caller and echo the stored thread.
    pub fn handle_post_beacon(
        &self,
        credentials: &Credentials,
        msg: &SubmitBeaconMsg,
        image: Vec<u8>,
        thumbnail: Vec<u8>,
    ) -> ApiResponse {
        self.respond(|| {
            self.service
                .require_authenticated(credentials.user_id, &credentials.secret)?;
            let new_beacon = msg.to_new_beacon(credentials.user_id, image, thumbnail);
            let id = self.service.add_beacon(new_beacon)?;
            let thread = self.service.get_thread(id)?;
            self.present_thread(&thread, Some(credentials.user_id))
        })
    }

    /// Like `handle_post_beacon`, starting from the raw JSON part.
    pub fn handle_post_beacon_json(
        &self,
        credentials: &Credentials,
        json: &str,
        image: Vec<u8>,
        thumbnail: Vec<u8>,
    ) -> ApiResponse {
        match serde_json::from_str::<SubmitBeaconMsg>(json) {
            Ok(msg) => self.handle_post_beacon(credentials, &msg, image, thumbnail),
            Err(_e) => {
                #[cfg(feature = "tracing-log")]
                tracing::warn!("[beacon-api] malformed beacon json: {}", _e);
                ApiResponse::error(ErrorCode::JsonError)
            }
        }
    }

    /// Comment on a beacon as the authenticated caller.
    pub fn handle_post_comment(
        &self,
        credentials: &Credentials,
        beacon_id: PostId,
        msg: &SubmitCommentMsg,
    ) -> ApiResponse {
        self.respond(|| {
            self.service
                .require_authenticated(credentials.user_id, &credentials.secret)?;
            let id = self.service.add_comment(NewComment {
                beacon_id,
                poster_id: credentials.user_id,
                text: msg.post.text.clone(),
            })?;
            Ok(SubmitCommentMsg {
                post: PostMsg {
                    id,
                    poster: credentials.user_id,
                    text: msg.post.text.clone(),
                },
            })
        })
    }

    /// A beacon thread. Bad or missing credentials read anonymously.
    pub fn handle_get_thread(&self, id: PostId, credentials: Option<&Credentials>) -> ApiResponse {
        self.respond(|| {
            let viewer = self.viewer(credentials);
            let thread = self.service.get_thread(id)?;
            self.present_thread(&thread, viewer)
        })
    }

    /// Beacons around a point, comments omitted.
    pub fn handle_beacons_near(
        &self,
        center: LocationMsg,
        radius_miles: f64,
        credentials: Option<&Credentials>,
    ) -> ApiResponse {
        self.respond(|| {
            let viewer = self.viewer(credentials);
            let beacons = self
                .service
                .beacons_within(Geotag::from(center), radius_miles)?;
            beacons
                .iter()
                .map(|beacon| self.present_thread(beacon, viewer))
                .collect::<Result<Vec<_>, _>>()
        })
    }

    // =========================================================================
    // VOTES
    // =========================================================================

    pub fn handle_heart(&self, credentials: &Credentials, post_id: PostId) -> ApiResponse {
        self.respond_empty(|| {
            self.service
                .require_authenticated(credentials.user_id, &credentials.secret)?;
            self.service.heart(post_id, credentials.user_id)
        })
    }

    pub fn handle_unheart(&self, credentials: &Credentials, post_id: PostId) -> ApiResponse {
        self.respond_empty(|| {
            self.service
                .require_authenticated(credentials.user_id, &credentials.secret)?;
            self.service.unheart(post_id, credentials.user_id)
        })
    }

    pub fn handle_flag(&self, credentials: &Credentials, post_id: PostId) -> ApiResponse {
        self.respond_empty(|| {
            self.service
                .require_authenticated(credentials.user_id, &credentials.secret)?;
            self.service.flag(post_id, credentials.user_id)
        })
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Link a verified email to an account and hand out a fresh secret.
    ///
    /// A known email gets its secret rotated; otherwise a new account is
    /// created under `username`. Verifying the email with the identity
    /// provider happens before this call.
    pub fn handle_link_account(&self, username: &str, verified_email: &str) -> ApiResponse {
        self.respond(|| {
            let (id, secret) = match self.service.user_id_by_email(verified_email) {
                Ok(id) => (id, self.service.issue_secret(id)?),
                Err(e) if e.is_not_found() => {
                    let secret = generate_secret();
                    let id =
                        self.service
                            .create_user(username, secret.as_bytes(), verified_email)?;
                    (id, secret)
                }
                Err(e) => return Err(e),
            };

            #[cfg(feature = "tracing-log")]
            tracing::info!("[beacon-api] linked account {} for user {}", verified_email, id);

            Ok(CreateAccountRespMsg { id, secret })
        })
    }

    // =========================================================================
    // PRESENTATION
    // =========================================================================

    /// Response message for a beacon and whatever comments it carries.
    pub fn present_thread(
        &self,
        beacon: &Beacon,
        viewer: Option<UserId>,
    ) -> Result<RespBeaconMsg, StorageError> {
        let comments = beacon
            .comments
            .iter()
            .map(|comment| self.present_comment(comment, viewer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RespBeaconMsg {
            beacon: SubmitBeaconMsg {
                post: PostMsg {
                    id: beacon.id,
                    poster: beacon.poster_id,
                    text: beacon.description.clone(),
                },
                location: beacon.location.into(),
            },
            meta: self.post_meta(
                beacon.id,
                beacon.poster_id,
                beacon.hearts,
                beacon.created_at,
                viewer,
            )?,
            comments,
        })
    }

    pub fn present_comment(
        &self,
        comment: &Comment,
        viewer: Option<UserId>,
    ) -> Result<RespCommentMsg, StorageError> {
        Ok(RespCommentMsg {
            comment: SubmitCommentMsg {
                post: PostMsg {
                    id: comment.id,
                    poster: comment.poster_id,
                    text: comment.text.clone(),
                },
            },
            meta: self.post_meta(
                comment.id,
                comment.poster_id,
                comment.hearts,
                comment.created_at,
                viewer,
            )?,
        })
    }

    fn post_meta(
        &self,
        post_id: PostId,
        poster_id: UserId,
        hearts: u32,
        created_at: Timestamp,
        viewer: Option<UserId>,
    ) -> Result<PostMetaMsg, StorageError> {
        let hearted = match viewer {
            Some(user_id) => self.service.has_hearted(post_id, user_id)?,
            None => false,
        };
        Ok(PostMetaMsg {
            hearts,
            time: format_unix_date(created_at),
            username: self.service.get_username(poster_id)?,
            hearted,
        })
    }

    /// The caller's ID if their credentials check out.
    fn viewer(&self, credentials: Option<&Credentials>) -> Option<UserId> {
        let credentials = credentials?;
        match self
            .service
            .authenticate(credentials.user_id, &credentials.secret)
        {
            Ok(true) => Some(credentials.user_id),
            _ => None,
        }
    }

    fn respond<T, F>(&self, op: F) -> ApiResponse
    where
        T: Serialize,
        F: FnOnce() -> Result<T, StorageError>,
    {
        match op().and_then(|value| {
            serde_json::to_value(value).map_err(|e| StorageError::Storage(e.to_string()))
        }) {
            Ok(body) => ApiResponse::ok(body),
            Err(e) => error_response(&e),
        }
    }

    fn respond_empty<F>(&self, op: F) -> ApiResponse
    where
        F: FnOnce() -> Result<(), StorageError>,
    {
        match op() {
            Ok(()) => ApiResponse::empty(),
            Err(e) => error_response(&e),
        }
    }
}

/// Log the cause, answer with the generic message for its code.
pub fn error_response(err: &StorageError) -> ApiResponse {
    let code = error_code_for(err);

    #[cfg(feature = "tracing-log")]
    tracing::warn!("[beacon-api] {} ({}): {}", code.code(), code.message(), err);

    ApiResponse::error(code)
}
