//! Creating spreadsheet documents and the registry of the documents of a user.
use std::sync::Arc;

use adapter::Spreadsheets;
use chrono::Utc;
use primitives::{
    AdDef, CampaignDef, Config, KeywordDef, RecordId, SheetEntry, TabSpec, TenantId, UserId,
};
use slog::{info, Logger};

use crate::{
    db::{self, SheetRegistry},
    dispatch::{RESOURCES_HEADERS, RESOURCES_TAB},
    parse::TabLayout,
    Error,
};

pub const EXPLANATION_TAB: &str = "Forklaring";

const EXPLANATION: &str = "Fill in one campaign, ad or keyword per row of the Kampagner, Annoncer and Keywords tabs, \
starting at row 2. Rows missing a required field are skipped on sync. \
AllResources holds the resources to create on the advertising platform: rows with an empty Action are left alone \
and the outcome of every row is written to the Row Status column.";

/// The tabs of a newly created document.
pub fn document_tabs() -> Vec<TabSpec> {
    let mut resources = TabSpec::with_headers(RESOURCES_TAB, RESOURCES_HEADERS);
    resources.styled_header = false;

    vec![
        TabSpec::with_headers(CampaignDef::TAB, CampaignDef::HEADERS),
        TabSpec::with_headers(AdDef::TAB, AdDef::HEADERS),
        TabSpec::with_headers(KeywordDef::TAB, KeywordDef::HEADERS),
        resources,
        TabSpec::with_note(EXPLANATION_TAB, EXPLANATION),
    ]
}

#[derive(Debug, Clone)]
pub struct Provisioner {
    sheets: Arc<dyn Spreadsheets>,
    registry: Arc<dyn SheetRegistry>,
    /// Builds the url of a created document.
    config: Config,
    logger: Logger,
}

impl Provisioner {
    pub fn new(
        sheets: Arc<dyn Spreadsheets>,
        registry: Arc<dyn SheetRegistry>,
        config: Config,
        logger: Logger,
    ) -> Self {
        Self {
            sheets,
            registry,
            config,
            logger,
        }
    }

    /// Creates a document titled `title` and registers it for the user.
    ///
    /// The title is unique per tenant & user.
    pub async fn create_sheet(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        title: &str,
    ) -> Result<SheetEntry, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Missing sheet name".into()));
        }
        if tenant_id.as_str().trim().is_empty() {
            return Err(Error::Validation("Missing tenantId".into()));
        }
        if user_id.as_str().trim().is_empty() {
            return Err(Error::Validation("Missing userId".into()));
        }

        if self
            .registry
            .find_by_name(tenant_id, user_id, title)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!("A sheet named `{}` already exists", title)));
        }

        let sheet_id = self
            .sheets
            .create_document(title, &document_tabs())
            .await
            .map_err(Error::RemoteWrite)?;

        let entry = SheetEntry {
            id: RecordId::new(),
            tenant_id: tenant_id.clone(),
            user_id: user_id.clone(),
            sheet_url: self.config.sheet_url(sheet_id.as_str()),
            sheet_id,
            name: title.to_owned(),
            created_at: Utc::now(),
        };

        // a concurrent create may have registered the name in the meantime
        match self.registry.insert(entry.clone()).await {
            Ok(()) => {}
            Err(db::Error::Duplicate(name)) => {
                return Err(Error::Conflict(format!("A sheet named `{}` already exists", name)))
            }
            Err(error) => return Err(error.into()),
        }

        info!(&self.logger, "Created sheet"; "tenant" => %tenant_id, "user" => %user_id, "sheet" => %entry.sheet_id);

        Ok(entry)
    }

    pub async fn list_sheets(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> Result<Vec<SheetEntry>, Error> {
        Ok(self.registry.list(tenant_id, user_id).await?)
    }

    pub async fn get_sheet(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        id: RecordId,
    ) -> Result<SheetEntry, Error> {
        self.registry
            .find(tenant_id, user_id, id)
            .await?
            .ok_or_else(|| Error::not_found("sheet", id))
    }
}

#[cfg(test)]
mod test {
    use adapter::dummy::{DummySheets, SheetsCall};
    use pretty_assertions::assert_eq;
    use primitives::{config::DEVELOPMENT_CONFIG, test_util::discard_logger};
    use serde_json::json;

    use super::*;
    use crate::db::MemoryRegistry;

    fn setup() -> (Provisioner, DummySheets, MemoryRegistry) {
        let sheets = DummySheets::new();
        let registry = MemoryRegistry::new();
        let provisioner = Provisioner::new(
            Arc::new(sheets.clone()),
            Arc::new(registry.clone()),
            DEVELOPMENT_CONFIG.clone(),
            discard_logger(),
        );

        (provisioner, sheets, registry)
    }

    #[test]
    fn tabs_of_a_new_document() {
        let tabs = document_tabs();
        let titles: Vec<_> = tabs.iter().map(|tab| tab.title.as_str()).collect();

        assert_eq!(
            vec!["Kampagner", "Annoncer", "Keywords", "AllResources", "Forklaring"],
            titles
        );
        assert!(tabs[..3].iter().all(|tab| tab.frozen_header && tab.styled_header));
        assert!(tabs[3].frozen_header);
        assert_eq!(16, tabs[3].headers.len());
        assert!(tabs[4].headers.is_empty() && tabs[4].note.is_some());
    }

    #[tokio::test]
    async fn creates_and_registers_a_sheet() {
        let (provisioner, sheets, _registry) = setup();
        let tenant = TenantId::from("tenant-1");
        let user = UserId::from("user-1");

        let entry = provisioner
            .create_sheet(&tenant, &user, " Q3 campaigns ")
            .await
            .expect("Should create");

        assert_eq!("Q3 campaigns", entry.name);
        assert_eq!(DEVELOPMENT_CONFIG.sheet_url(entry.sheet_id.as_str()), entry.sheet_url);

        let created = sheets.created(&entry.sheet_id).expect("Should be created");
        assert_eq!("Q3 campaigns", created.title);
        assert_eq!(document_tabs(), created.tabs);

        let headers = &sheets.writes(&entry.sheet_id)[0];
        assert_eq!("Kampagner!A1:E1", headers[0].range);
        assert_eq!(
            vec![vec![json!("Campaign Name"), json!("Status"), json!("Budget"), json!("Start Date"), json!("End Date")]],
            headers[0].values
        );

        assert_eq!(
            vec![entry.clone()],
            provisioner.list_sheets(&tenant, &user).await.expect("Should list")
        );
        assert_eq!(
            entry,
            provisioner
                .get_sheet(&tenant, &user, entry.id)
                .await
                .expect("Should get")
        );
    }

    #[tokio::test]
    async fn rejects_blank_and_taken_names() {
        let (provisioner, sheets, _registry) = setup();
        let tenant = TenantId::from("tenant-1");
        let user = UserId::from("user-1");

        let blank = provisioner.create_sheet(&tenant, &user, "  ").await;
        assert!(matches!(blank, Err(Error::Validation(_))));

        provisioner
            .create_sheet(&tenant, &user, "Q3")
            .await
            .expect("Should create");

        sheets.fail(SheetsCall::CreateDocument, "Should not be called");
        let taken = provisioner.create_sheet(&tenant, &user, "Q3").await;
        assert!(matches!(taken, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn sheets_of_other_users_are_not_found() {
        let (provisioner, _sheets, _registry) = setup();
        let tenant = TenantId::from("tenant-1");

        let entry = provisioner
            .create_sheet(&tenant, &UserId::from("user-1"), "Q3")
            .await
            .expect("Should create");

        let other_user = UserId::from("user-2");
        let error = provisioner
            .get_sheet(&tenant, &other_user, entry.id)
            .await
            .expect_err("Should not find it");

        assert!(error.is_not_found());
        assert!(provisioner
            .list_sheets(&tenant, &other_user)
            .await
            .expect("Should list")
            .is_empty());
    }
}
