//! 两步注册流程
//!
//! 第一步收集并校验账户凭据，第二步收集可选的个人资料。
//! 只有最后一步才会发起请求：先创建账户，成功后再尝试保存资料。

use codesage_shared::Profile;

use crate::api::CodeSageApi;
use crate::auth::SubmitError;
use crate::identity::{IdentityClient, Session};
use crate::validation::{self, FieldErrors};
use crate::web::HttpClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Credentials,
    Profile,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::Credentials => 1,
            Step::Profile => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub display_name: String,
    pub bio: String,
}

impl ProfileDraft {
    /// 用户填写了任意资料字段时返回待保存的资料
    pub fn to_profile(&self) -> Option<Profile> {
        let display_name = self.display_name.trim();
        let bio = self.bio.trim();
        if display_name.is_empty() && bio.is_empty() {
            return None;
        }
        Some(Profile {
            display_name: display_name.to_string(),
            bio: bio.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupWizard {
    step: Step,
    pub credentials: Credentials,
    pub profile: ProfileDraft,
    errors: FieldErrors,
}

impl SignupWizard {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn validate_credentials(&self) -> Result<(), FieldErrors> {
        let c = &self.credentials;
        validation::validate_credentials(&c.email, &c.password, &c.confirm)
    }

    fn validate_profile(&self) -> Result<(), FieldErrors> {
        validation::validate_profile(&self.profile.display_name, &self.profile.bio)
    }

    /// 校验第一步并进入第二步；校验失败时停留并记录字段错误
    pub fn advance(&mut self) -> bool {
        if self.step != Step::Credentials {
            return false;
        }
        match self.validate_credentials() {
            Ok(()) => {
                self.errors = FieldErrors::default();
                self.step = Step::Profile;
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    pub fn back(&mut self) {
        self.errors = FieldErrors::default();
        self.step = Step::Credentials;
    }

    /// 接收提交结果的步骤与字段错误，保留提交期间输入的内容
    pub fn adopt_outcome(&mut self, submitted: &SignupWizard) {
        self.step = submitted.step;
        self.errors = submitted.errors.clone();
    }

    /// 提交前的完整校验；凭据有误时回到第一步
    pub fn validate_submission(&mut self) -> Result<(), FieldErrors> {
        if let Err(errors) = self.validate_credentials() {
            self.step = Step::Credentials;
            self.errors = errors.clone();
            return Err(errors);
        }
        if let Err(errors) = self.validate_profile() {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors = FieldErrors::default();
        Ok(())
    }
}

/// 完成注册
///
/// 账户创建失败时返回错误；与凭据相关的错误码会把向导切回第一步。
/// 资料保存失败只记录日志，不影响注册结果。
pub async fn complete_signup<I, A>(
    identity: &IdentityClient<I>,
    api: &CodeSageApi<A>,
    wizard: &mut SignupWizard,
    now: i64,
) -> Result<Session, SubmitError>
where
    I: HttpClient,
    A: HttpClient,
{
    wizard.validate_submission().map_err(SubmitError::Invalid)?;

    let credentials = &wizard.credentials;
    let mut session = match identity
        .sign_up(&credentials.email, &credentials.password, now)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            if e.code().is_some_and(|code| code.concerns_credentials()) {
                wizard.step = Step::Credentials;
            }
            log::info!("[signup] account creation failed: {}", e);
            return Err(SubmitError::Auth(e));
        }
    };
    log::info!("[signup] account created for {}", session.uid);

    if let Some(profile) = wizard.profile.to_profile() {
        match api.save_profile(&session.id_token, profile.clone()).await {
            Ok(_) => {
                if !profile.display_name.is_empty() {
                    session.display_name = Some(profile.display_name);
                }
            }
            Err(e) => log::warn!("[signup] profile could not be saved: {}", e),
        }
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityConfig;
    use crate::identity::AuthErrorCode;
    use crate::validation::Field;
    use crate::web::mock::MockHttpClient;
    use codesage_shared::HttpMethod;
    use std::time::Duration;

    const NOW: i64 = 1_800_000_000_000;
    const SIGN_UP_URL: &str = "https://id.test/v1/accounts:signUp?key=k";
    const PROFILE_URL: &str = "https://api.test/api/profile";
    const SIGN_UP_OK: &str = r#"{"localId":"u1","email":"ada@example.com","idToken":"id-1",
        "refreshToken":"refresh-1","expiresIn":"3600"}"#;

    fn create_clients() -> (IdentityClient<MockHttpClient>, CodeSageApi<MockHttpClient>) {
        let config = IdentityConfig {
            api_key: "k".to_string(),
            auth_origin: "https://id.test".to_string(),
            token_origin: "https://token.test".to_string(),
        };
        (
            IdentityClient::new(config, Duration::from_secs(5), MockHttpClient::new()),
            CodeSageApi::new("https://api.test", Duration::from_secs(5), MockHttpClient::new()),
        )
    }

    fn filled_wizard() -> SignupWizard {
        let mut wizard = SignupWizard::default();
        wizard.credentials = Credentials {
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
            confirm: "secret1".to_string(),
        };
        assert!(wizard.advance());
        wizard
    }

    #[test]
    fn test_advance_requires_valid_matching_credentials() {
        let mut wizard = SignupWizard::default();
        wizard.credentials = Credentials {
            email: "ada@example".to_string(),
            password: "secret1".to_string(),
            confirm: "secret1".to_string(),
        };
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), Step::Credentials);
        assert!(wizard.errors().get(Field::Email).is_some());

        wizard.credentials.email = "ada@example.com".to_string();
        wizard.credentials.confirm = "secret2".to_string();
        assert!(!wizard.advance());
        assert!(wizard.errors().get(Field::ConfirmPassword).is_some());

        wizard.credentials.password = "short".to_string();
        wizard.credentials.confirm = "short".to_string();
        assert!(!wizard.advance());
        assert!(wizard.errors().get(Field::Password).is_some());

        wizard.credentials.password = "secret1".to_string();
        wizard.credentials.confirm = "secret1".to_string();
        assert!(wizard.advance());
        assert_eq!(wizard.step(), Step::Profile);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn test_back_keeps_entered_values() {
        let mut wizard = filled_wizard();
        wizard.profile.display_name = "Ada".to_string();
        wizard.back();
        assert_eq!(wizard.step(), Step::Credentials);
        assert_eq!(wizard.credentials.email, "ada@example.com");
        assert_eq!(wizard.profile.display_name, "Ada");
    }

    #[test]
    fn test_profile_draft_is_optional() {
        assert_eq!(ProfileDraft::default().to_profile(), None);
        let draft = ProfileDraft {
            display_name: String::new(),
            bio: " Rustacean ".to_string(),
        };
        assert_eq!(draft.to_profile().unwrap().bio, "Rustacean");
    }

    #[tokio::test]
    async fn test_invalid_wizard_sends_nothing() {
        let (identity, api) = create_clients();
        let mut wizard = filled_wizard();
        wizard.profile.display_name = "A".to_string();

        let err = complete_signup(&identity, &api, &mut wizard, NOW).await.unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(ref e) if e.get(Field::DisplayName).is_some()));
        assert_eq!(wizard.step(), Step::Profile);
        assert_eq!(identity.client_requests(), 0);
        assert_eq!(api.client_requests(), 0);
    }

    #[tokio::test]
    async fn test_signup_saves_profile_with_new_token() {
        let (identity, api) = create_clients();
        identity.mock(HttpMethod::Post, SIGN_UP_URL, 200, SIGN_UP_OK);
        api.mock(
            HttpMethod::Post,
            PROFILE_URL,
            200,
            r#"{"displayName":"Ada","bio":""}"#,
        );
        let mut wizard = filled_wizard();
        wizard.profile.display_name = " Ada ".to_string();

        let session = complete_signup(&identity, &api, &mut wizard, NOW).await.unwrap();

        assert_eq!(session.uid, "u1");
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
        let req = api.last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer id-1"));
        assert_eq!(req.body.as_deref(), Some(r#"{"displayName":"Ada","bio":""}"#));
    }

    #[tokio::test]
    async fn test_profile_failure_does_not_fail_signup() {
        let (identity, api) = create_clients();
        identity.mock(HttpMethod::Post, SIGN_UP_URL, 200, SIGN_UP_OK);
        api.mock(HttpMethod::Post, PROFILE_URL, 500, r#"{"detail":"db down"}"#);
        let mut wizard = filled_wizard();
        wizard.profile.bio = "Hello".to_string();

        let session = complete_signup(&identity, &api, &mut wizard, NOW).await.unwrap();

        assert_eq!(session.uid, "u1");
        assert_eq!(session.display_name, None);
        assert_eq!(api.client_requests(), 1);
    }

    #[tokio::test]
    async fn test_empty_profile_is_not_saved() {
        let (identity, api) = create_clients();
        identity.mock(HttpMethod::Post, SIGN_UP_URL, 200, SIGN_UP_OK);
        let mut wizard = filled_wizard();

        complete_signup(&identity, &api, &mut wizard, NOW).await.unwrap();
        assert_eq!(api.client_requests(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_returns_to_first_step() {
        let (identity, api) = create_clients();
        identity.mock(
            HttpMethod::Post,
            SIGN_UP_URL,
            400,
            r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#,
        );
        let mut wizard = filled_wizard();
        wizard.profile.display_name = "Ada".to_string();

        let err = complete_signup(&identity, &api, &mut wizard, NOW).await.unwrap_err();

        assert_eq!(wizard.step(), Step::Credentials);
        assert_eq!(err.to_string(), AuthErrorCode::EmailExists.user_message());
        assert_eq!(api.client_requests(), 0);
    }

    #[tokio::test]
    async fn test_other_failures_keep_current_step() {
        let (identity, api) = create_clients();
        identity.mock(
            HttpMethod::Post,
            SIGN_UP_URL,
            400,
            r#"{"error":{"code":400,"message":"OPERATION_NOT_ALLOWED"}}"#,
        );
        let mut wizard = filled_wizard();

        assert!(complete_signup(&identity, &api, &mut wizard, NOW).await.is_err());
        assert_eq!(wizard.step(), Step::Profile);
    }

    #[tokio::test]
    async fn test_edits_during_submission_survive_outcome() {
        let (identity, api) = create_clients();
        identity.mock(
            HttpMethod::Post,
            SIGN_UP_URL,
            400,
            r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#,
        );
        let mut live = filled_wizard();
        live.profile.display_name = "Ada".to_string();
        let mut submitted = live.clone();

        assert!(complete_signup(&identity, &api, &mut submitted, NOW).await.is_err());
        // 请求进行中用户继续编辑
        live.profile.bio = "Rustacean".to_string();
        live.adopt_outcome(&submitted);

        assert_eq!(live.step(), Step::Credentials);
        assert_eq!(live.errors(), submitted.errors());
        assert_eq!(live.profile.display_name, "Ada");
        assert_eq!(live.profile.bio, "Rustacean");
    }
}
