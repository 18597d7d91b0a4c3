//! Stable identifiers for the Xbox Live services funnelling calls through the pipeline.

// self
use crate::_prelude::*;

/// Logical API id; the key under which throttle observations are recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XboxLiveApi {
	#[default]
	/// Calls that are not attributed to a specific service API.
	Unspecified,
	/// Leaderboard reads for a title.
	GetLeaderboard,
	/// Social leaderboard reads.
	GetLeaderboardForSocialGroup,
	/// Privacy avoid/mute list reads.
	GetAvoidOrMuteList,
	/// Batched privacy permission checks.
	CheckMultiplePermissionsWithMultipleTargetUsers,
	/// Title storage quota reads.
	GetQuota,
	/// Title storage blob metadata listing.
	GetBlobMetadata,
	/// Title storage blob download.
	DownloadBlob,
	/// Title storage blob upload.
	UploadBlob,
	/// Title storage blob deletion.
	DeleteBlob,
	/// Multiplayer session document writes.
	WriteSessionUsingSubpath,
	/// Multiplayer session document reads.
	GetSessionUsingSubpath,
	/// Multiplayer session searches.
	GetSessions,
	/// Telemetry event uploads.
	WriteInGameEvent,
}
impl XboxLiveApi {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			XboxLiveApi::Unspecified => "unspecified",
			XboxLiveApi::GetLeaderboard => "get_leaderboard",
			XboxLiveApi::GetLeaderboardForSocialGroup => "get_leaderboard_for_social_group",
			XboxLiveApi::GetAvoidOrMuteList => "get_avoid_or_mute_list",
			XboxLiveApi::CheckMultiplePermissionsWithMultipleTargetUsers =>
				"check_multiple_permissions_with_multiple_target_users",
			XboxLiveApi::GetQuota => "get_quota",
			XboxLiveApi::GetBlobMetadata => "get_blob_metadata",
			XboxLiveApi::DownloadBlob => "download_blob",
			XboxLiveApi::UploadBlob => "upload_blob",
			XboxLiveApi::DeleteBlob => "delete_blob",
			XboxLiveApi::WriteSessionUsingSubpath => "write_session_using_subpath",
			XboxLiveApi::GetSessionUsingSubpath => "get_session_using_subpath",
			XboxLiveApi::GetSessions => "get_sessions",
			XboxLiveApi::WriteInGameEvent => "write_in_game_event",
		}
	}
}
impl Display for XboxLiveApi {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
