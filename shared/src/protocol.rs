use crate::{AnalysisReport, CreateProjectResponse, Profile, Project, ReviewResult};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, including any path parameters.
    fn path(&self) -> String;
}

/// Percent-encodes a single path segment (RFC 3986 unreserved characters pass through).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

// =========================================================
// Request Definitions
// =========================================================

/// List the caller's projects
#[derive(Debug, Serialize)]
pub struct ListProjectsRequest;

impl ApiRequest for ListProjectsRequest {
    type Response = Vec<Project>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/projects".to_string()
    }
}

/// Register a repository; the backend derives the project name from the URL.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub github_url: String,
}

impl ApiRequest for CreateProjectRequest {
    type Response = CreateProjectResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/projects".to_string()
    }
}

/// Rename a project
#[derive(Debug, Clone, Serialize)]
pub struct UpdateProjectRequest {
    #[serde(skip)]
    pub id: String,
    pub name: String,
}

impl ApiRequest for UpdateProjectRequest {
    type Response = Project;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/projects/{}", encode_segment(&self.id))
    }
}

/// Delete a project. The backend answers 204 with an empty body.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteProjectRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteProjectRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/api/projects/{}", encode_segment(&self.id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetAnalysisRequest {
    #[serde(skip)]
    pub project_id: String,
}

impl ApiRequest for GetAnalysisRequest {
    type Response = AnalysisReport;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/projects/{}/analysis", encode_segment(&self.project_id))
    }
}

#[derive(Debug, Serialize)]
pub struct GetProfileRequest;

impl ApiRequest for GetProfileRequest {
    type Response = Profile;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/profile".to_string()
    }
}

/// Save the caller's profile (`{displayName, bio}` on the wire)
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SaveProfileRequest {
    pub profile: Profile,
}

impl ApiRequest for SaveProfileRequest {
    type Response = Profile;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/profile".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCodeRequest {
    pub code_snippet: String,
    pub language: String,
}

impl ApiRequest for ReviewCodeRequest {
    type Response = ReviewResult;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/review-code".to_string()
    }
}
