//! # Wire Messages
//!
//! JSON shapes exchanged with clients. Larger messages are composed from the
//! smaller ones with `#[serde(flatten)]`, so on the wire a `RespBeaconMsg` is
//! a single flat object while in Rust each part keeps its own name.

use crate::entities::{Geotag, NewBeacon, PostId, UserId};
use serde::{Deserialize, Serialize};

/// Fields common to every submitted post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostMsg {
    #[serde(default)]
    pub id: PostId,
    #[serde(rename = "user")]
    pub poster: UserId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationMsg {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "long")]
    pub longitude: f64,
}

impl From<Geotag> for LocationMsg {
    fn from(tag: Geotag) -> Self {
        Self {
            latitude: tag.latitude,
            longitude: tag.longitude,
        }
    }
}

impl From<LocationMsg> for Geotag {
    fn from(msg: LocationMsg) -> Self {
        Geotag::new(msg.latitude, msg.longitude)
    }
}

/// Read-side fields added to every post in a response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostMetaMsg {
    pub hearts: u32,
    pub time: String,
    pub username: String,
    pub hearted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmitBeaconMsg {
    #[serde(flatten)]
    pub post: PostMsg,
    #[serde(flatten)]
    pub location: LocationMsg,
}

impl SubmitBeaconMsg {
    /// Builds the storage input. The poster comes from the authenticated
    /// caller, not from the message body.
    pub fn to_new_beacon(&self, poster: UserId, image: Vec<u8>, thumbnail: Vec<u8>) -> NewBeacon {
        NewBeacon {
            image,
            thumbnail,
            location: self.location.into(),
            poster_id: poster,
            description: self.post.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitCommentMsg {
    #[serde(flatten)]
    pub post: PostMsg,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RespCommentMsg {
    #[serde(flatten)]
    pub comment: SubmitCommentMsg,
    #[serde(flatten)]
    pub meta: PostMetaMsg,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RespBeaconMsg {
    #[serde(flatten)]
    pub beacon: SubmitBeaconMsg,
    #[serde(flatten)]
    pub meta: PostMetaMsg,
    pub comments: Vec<RespCommentMsg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateAccountReqMsg {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateAccountRespMsg {
    pub id: UserId,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub code: u16,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_beacon_response_is_flat_on_the_wire() {
        let msg = RespBeaconMsg {
            beacon: SubmitBeaconMsg {
                post: PostMsg {
                    id: 4,
                    poster: 9,
                    text: "quad at noon".into(),
                },
                location: LocationMsg {
                    latitude: 33.21,
                    longitude: -87.54,
                },
            },
            meta: PostMetaMsg {
                hearts: 2,
                time: "Mon Jan  2 15:04:05 UTC 2006".into(),
                username: "alice".into(),
                hearted: true,
            },
            comments: vec![],
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 4,
                "user": 9,
                "text": "quad at noon",
                "lat": 33.21,
                "long": -87.54,
                "hearts": 2,
                "time": "Mon Jan  2 15:04:05 UTC 2006",
                "username": "alice",
                "hearted": true,
                "comments": []
            })
        );
    }

    #[test]
    fn test_submit_beacon_parses_without_id() {
        let msg: SubmitBeaconMsg =
            serde_json::from_str(r#"{"user": 3, "text": "hi", "lat": 1.5, "long": -2.5}"#).unwrap();
        assert_eq!(msg.post.id, 0);
        assert_eq!(msg.post.poster, 3);

        let new_beacon = msg.to_new_beacon(11, b"img".to_vec(), Vec::new());
        assert_eq!(new_beacon.poster_id, 11);
        assert_eq!(new_beacon.location, Geotag::new(1.5, -2.5));
        assert_eq!(new_beacon.description, "hi");
    }
}
