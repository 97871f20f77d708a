use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::LostFoundError;
use crate::post::{Category, NewPost};

/// Upper bound for an attached image.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Storage bucket that holds post images.
pub const IMAGE_BUCKET: &str = "lost-found-images";

/// The post-creation form as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub location: String,
    pub contact_info: String,
    /// `YYYY-MM-DD`, as produced by a date input; blank when not given.
    pub date_lost_found: String,
}

fn required(value: &str, field: &str) -> Result<String, LostFoundError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LostFoundError::InvalidRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PostDraft {
    /// Checks the required fields and turns the draft into an insert row
    /// owned by `user_id`.
    pub fn into_new_post(
        self,
        user_id: Uuid,
        image_url: Option<String>,
    ) -> Result<NewPost, LostFoundError> {
        let title = required(&self.title, "Title")?;
        let category = self
            .category
            .ok_or_else(|| LostFoundError::InvalidRequest("Category is required".to_string()))?;
        let description = required(&self.description, "Description")?;
        let contact_info = required(&self.contact_info, "Contact information")?;

        let date_lost_found = match optional(&self.date_lost_found) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                LostFoundError::InvalidRequest(format!(
                    "Date lost/found must look like 2024-05-31, got '{raw}'"
                ))
            })?),
            None => None,
        };

        Ok(NewPost {
            user_id,
            title,
            description,
            category,
            location: optional(&self.location),
            contact_info,
            date_lost_found,
            image_url,
        })
    }

    /// Runs the same checks as [`PostDraft::into_new_post`] without consuming the draft.
    pub fn validate(&self) -> Result<(), LostFoundError> {
        self.clone().into_new_post(Uuid::nil(), None).map(|_| ())
    }
}

/// An image picked in the form, already read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Accepts the file only if it is within [`MAX_IMAGE_BYTES`].
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, LostFoundError> {
        check_size(bytes.len() as u64)?;
        Ok(Self {
            name: name.into(),
            bytes,
        })
    }

    /// Text after the last `.` of the file name, or the whole name if it has no dot.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Object key inside the bucket: `{user_id}/{epoch_millis}.{ext}`.
    pub fn object_path(&self, user_id: Uuid, epoch_millis: i64) -> String {
        format!("{}/{}.{}", user_id, epoch_millis, self.extension())
    }

    pub fn content_type(&self) -> mime::Mime {
        match self.extension().to_ascii_lowercase().as_str() {
            "png" => mime::IMAGE_PNG,
            "jpg" | "jpeg" => mime::IMAGE_JPEG,
            "gif" => mime::IMAGE_GIF,
            "bmp" => mime::IMAGE_BMP,
            "svg" => mime::IMAGE_SVG,
            other => format!("image/{other}")
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        }
    }
}

/// Size gate shared by front-ends that learn the size before reading the file.
pub fn check_size(size: u64) -> Result<(), LostFoundError> {
    if size > MAX_IMAGE_BYTES {
        return Err(LostFoundError::ImageTooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PostDraft {
        PostDraft {
            title: "  Found car keys ".into(),
            description: "Toyota fob with a red tag".into(),
            category: Some(Category::Found),
            location: "   ".into(),
            contact_info: "keys@example.com".into(),
            date_lost_found: "2024-05-31".into(),
        }
    }

    #[test]
    fn complete_draft_becomes_an_insert_row() {
        let user = Uuid::new_v4();
        let row = draft()
            .into_new_post(user, Some("https://cdn/x.png".into()))
            .unwrap();
        assert_eq!(row.user_id, user);
        assert_eq!(row.title, "Found car keys");
        assert_eq!(row.location, None);
        assert_eq!(row.date_lost_found, NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(row.image_url.as_deref(), Some("https://cdn/x.png"));
    }

    #[test]
    fn each_required_field_is_enforced() {
        let cases: [(fn(&mut PostDraft), &str); 4] = [
            (|d| d.title.clear(), "Title"),
            (|d| d.description = " ".into(), "Description"),
            (|d| d.category = None, "Category"),
            (|d| d.contact_info.clear(), "Contact information"),
        ];
        for (blank, field) in cases {
            let mut d = draft();
            blank(&mut d);
            match d.validate() {
                Err(LostFoundError::InvalidRequest(msg)) => assert!(msg.starts_with(field), "{msg}"),
                other => panic!("expected {field} to be required, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_optional_fields_become_null() {
        let mut d = draft();
        d.date_lost_found = String::new();
        let row = d.into_new_post(Uuid::nil(), None).unwrap();
        assert_eq!(row.date_lost_found, None);
        assert_eq!(row.location, None);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut d = draft();
        d.date_lost_found = "31/05/2024".into();
        assert!(matches!(d.validate(), Err(LostFoundError::InvalidRequest(_))));
    }

    #[test]
    fn images_over_the_cap_are_refused() {
        assert!(ImageFile::new("ok.png", vec![0; 1024]).is_ok());
        assert!(check_size(MAX_IMAGE_BYTES).is_ok());
        match check_size(MAX_IMAGE_BYTES + 1) {
            Err(LostFoundError::ImageTooLarge { size, limit }) => {
                assert_eq!(size, MAX_IMAGE_BYTES + 1);
                assert_eq!(limit, MAX_IMAGE_BYTES);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn object_path_uses_owner_timestamp_and_extension() {
        let user = Uuid::parse_str("0d6f3b8e-2f55-4b8e-8d43-6c2a0b1c9e77").unwrap();
        let image = ImageFile::new("holiday.photo.JPG", vec![1, 2, 3]).unwrap();
        assert_eq!(
            image.object_path(user, 1_717_000_000_000),
            "0d6f3b8e-2f55-4b8e-8d43-6c2a0b1c9e77/1717000000000.JPG"
        );
        assert_eq!(image.content_type(), mime::IMAGE_JPEG);

        let bare = ImageFile::new("scan", vec![]).unwrap();
        assert_eq!(bare.extension(), "scan");
    }

    #[test]
    fn unknown_extensions_fall_back_to_an_image_type() {
        let webp = ImageFile::new("cat.webp", vec![]).unwrap();
        assert_eq!(webp.content_type().essence_str(), "image/webp");
    }
}
