use std::sync::Arc;

use crate::application::{
    admin::AdminTranslationService, repos::TranslationsRepo, translations::TranslationResolver,
};

use super::auth::AdminAuth;

#[derive(Clone)]
pub struct AdminState {
    pub translations: Arc<AdminTranslationService>,
    pub resolver: TranslationResolver,
    pub store: Arc<dyn TranslationsRepo>,
    pub auth: AdminAuth,
}
