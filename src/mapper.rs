//! Gallery Core - Representation Mapping
//!
//! Total conversions between the wire DTOs, the cache rows and the
//! domain model. None of these can fail: malformed colors fall back to
//! the gray sentinel and absent fields stay absent.

use crate::cache::PhotoRow;
use crate::dto::{PhotoDto, PhotosResponseDto};
use crate::model::{AvgColor, Photo, PhotoPage};

/// Wire page to domain page. `has_next_page` is derived from the
/// presence of the next-page indicator, not from a numeric cursor.
pub fn page_from_dto(dto: PhotosResponseDto) -> PhotoPage {
    let has_next_page = dto.next_page.as_deref().is_some_and(|url| !url.is_empty());
    PhotoPage {
        photos: dto.photos.into_iter().map(photo_from_dto).collect(),
        total_results: dto.total_results,
        page: dto.page,
        per_page: dto.per_page,
        has_next_page,
    }
}

/// Wire photo to domain photo.
pub fn photo_from_dto(dto: PhotoDto) -> Photo {
    let (thumbnail_url, tiny_thumbnail_url, large_image_url) = match dto.src {
        Some(src) => (src.medium, src.tiny, src.large),
        None => (None, None, None),
    };
    Photo {
        id: dto.id,
        kind: dto.kind,
        width: dto.width,
        height: dto.height,
        url: dto.url,
        photographer: dto.photographer,
        photographer_url: dto.photographer_url,
        photographer_id: dto.photographer_id,
        avg_color: AvgColor::parse(dto.avg_color.as_deref()),
        thumbnail_url,
        tiny_thumbnail_url,
        large_image_url,
        liked: dto.liked,
        alt: dto.alt,
    }
}

/// Cache row to domain photo. `kind` and `liked` exist only on the wire.
pub fn photo_from_row(row: PhotoRow) -> Photo {
    Photo {
        id: row.id,
        kind: None,
        width: row.width,
        height: row.height,
        url: row.url,
        photographer: row.photographer,
        photographer_url: row.photographer_url,
        photographer_id: row.photographer_id,
        avg_color: AvgColor::parse(row.avg_color.as_deref()),
        thumbnail_url: row.thumbnail_url,
        tiny_thumbnail_url: row.tiny_thumbnail_url,
        large_image_url: row.large_image_url,
        liked: None,
        alt: row.alt,
    }
}

/// Domain photo to cache row, dropping the wire-only fields.
pub fn row_from_photo(photo: &Photo) -> PhotoRow {
    PhotoRow {
        id: photo.id,
        width: photo.width,
        height: photo.height,
        url: photo.url.clone(),
        photographer: photo.photographer.clone(),
        photographer_url: photo.photographer_url.clone(),
        photographer_id: photo.photographer_id,
        avg_color: Some(photo.avg_color.to_hex()),
        thumbnail_url: photo.thumbnail_url.clone(),
        tiny_thumbnail_url: photo.tiny_thumbnail_url.clone(),
        large_image_url: photo.large_image_url.clone(),
        alt: photo.alt.clone(),
    }
}
