//! # 实体定义测试
//!
//! 测试所有 Sea-ORM 实体定义的正确性

#[cfg(test)]
mod tests {
    use crate::{model_aliases, models, provider_credentials, provider_types, teams};
    use sea_orm::Set;

    #[tokio::test]
    async fn test_provider_type_creation() {
        let provider = provider_types::ActiveModel {
            name: Set("openai".to_string()),
            display_name: Set("OpenAI".to_string()),
            base_url: Set("api.openai.com".to_string()),
            api_format: Set("openai".to_string()),
            is_active: Set(true),
            ..Default::default()
        };

        assert_eq!(provider.name.as_ref(), "openai");
        assert_eq!(provider.is_active.as_ref(), &true);
    }

    #[tokio::test]
    async fn test_credential_creation() {
        let credential = provider_credentials::ActiveModel {
            team_id: Set(1),
            provider_type_id: Set(1),
            api_key: Set("sk-test123".to_string()),
            name: Set("默认OpenAI凭证".to_string()),
            status: Set(provider_credentials::status::ACTIVE.to_string()),
            is_default: Set(true),
            priority: Set(1),
            ..Default::default()
        };

        assert_eq!(credential.api_key.as_ref(), "sk-test123");
        assert_eq!(credential.priority.as_ref(), &1);
    }

    #[tokio::test]
    async fn test_model_and_alias_creation() {
        let model = models::ActiveModel {
            provider_type_id: Set(1),
            provider_model_id: Set("gpt-4".to_string()),
            unified_id: Set("openai:gpt-4".to_string()),
            display_name: Set(Some("GPT-4".to_string())),
            context_length: Set(Some(8192)),
            ..Default::default()
        };
        assert_eq!(model.unified_id.as_ref(), "openai:gpt-4");

        let alias = model_aliases::ActiveModel {
            model_id: Set(1),
            alias: Set("gpt4".to_string()),
            team_id: Set(None),
            ..Default::default()
        };
        assert_eq!(alias.alias.as_ref(), "gpt4");
    }

    #[test]
    fn test_credential_usability() {
        let mut credential = provider_credentials::Model {
            id: 1,
            team_id: 1,
            provider_type_id: 1,
            api_key: "sk-test".to_string(),
            name: "test".to_string(),
            status: provider_credentials::status::ACTIVE.to_string(),
            is_default: true,
            priority: 1,
            last_sync_at: None,
            last_error: None,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert!(credential.is_usable());

        credential.status = provider_credentials::status::ERROR.to_string();
        assert!(!credential.is_usable());
    }

    #[test]
    fn test_global_alias_flag() {
        let alias = model_aliases::Model {
            id: 1,
            model_id: 1,
            alias: "sonnet".to_string(),
            team_id: None,
            created_at: chrono::Utc::now().naive_utc(),
        };
        assert!(alias.is_global());

        let team = teams::Model {
            id: 1,
            name: "default".to_string(),
            display_name: "Default Team".to_string(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert!(team.is_active);
    }
}
