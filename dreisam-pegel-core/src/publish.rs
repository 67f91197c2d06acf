use tracing::{error, info, warn};

use crate::contract::{NewStatus, PostedStatus, Poster, Visibility};
use crate::error::PostError;
use crate::message::ComposedMessage;

/// Post `message`, attaching `chart` if one was rendered.
///
/// A failed media upload is logged and the status goes out text-only.
/// A failed status post is returned to the caller.
pub async fn publish<P>(
    poster: &P,
    message: &ComposedMessage,
    chart: Option<Vec<u8>>,
    visibility: Visibility,
) -> Result<PostedStatus, PostError>
where
    P: Poster + ?Sized,
{
    let mut media_ids = Vec::new();
    if let Some(png) = chart {
        match poster.upload_media(png).await {
            Ok(attachment) => {
                info!(media_id = %attachment.id, "[POST] Uploaded chart");
                media_ids.push(attachment.id);
            }
            Err(e) => {
                warn!(error = %e, "[POST] Cannot upload chart, posting text only");
            }
        }
    }

    let status = NewStatus {
        text: message.text.clone(),
        visibility,
        media_ids,
    };

    match poster.post_status(status).await {
        Ok(posted) => {
            info!(status_id = %posted.id, url = ?posted.url, warning = message.is_warning, "[POST] Status posted");
            Ok(posted)
        }
        Err(e) => {
            error!(error = %e, "[POST][ERROR] Failed to send status");
            Err(e)
        }
    }
}
