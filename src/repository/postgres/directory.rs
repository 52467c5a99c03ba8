use async_trait::async_trait;

use super::{ListQuery, PostgresRepository};
use crate::{
    models::{
        Paginated,
        directory::{
            BoardMember, BoardMemberInput, Broker, BrokerInput, Career, CareerInput, Commodity,
            CommodityInput, DirectoryFilter, Partner, PartnerInput, Publication,
            PublicationInput, ReorderEntry, TeamMember, TeamMemberInput, Trader, TraderInput,
        },
    },
    repository::{DirectoryRepository, RepoError, RepoResult},
};

impl PostgresRepository {
    /// Rewrites `order_index` for every entry in one transaction.
    async fn reorder(&self, table: &'static str, entries: &[ReorderEntry]) -> RepoResult<()> {
        let sql = format!("UPDATE {table} SET order_index = $2, updated_at = NOW() WHERE id = $1");
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            let result = sqlx::query(&sql)
                .bind(entry.id)
                .bind(entry.order_index)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for PostgresRepository {
    // --- Team members ---

    async fn list_team_members(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<TeamMember>> {
        let query = ListQuery {
            table: "team_members",
            search_columns: &["name", "title", "description"],
            search: filter.search.clone(),
            exact: vec![("member_type", filter.member_type.clone())],
            predicate: None,
            order_by: "order_index ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_team_member(&self, id: i64) -> RepoResult<Option<TeamMember>> {
        self.fetch_row("team_members", id).await
    }

    async fn create_team_member(&self, input: &TeamMemberInput) -> RepoResult<TeamMember> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (
                name, title, description, image, member_type, order_index,
                linkedin_url, twitter_url, facebook_url, instagram_url
            )
            VALUES (
                $1, $2, $3, $4, $5,
                COALESCE($6, (SELECT COALESCE(MAX(order_index), 0) + 1
                              FROM team_members WHERE member_type = $5)),
                $7, $8, $9, $10
            )
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.member_type)
        .bind(input.order_index)
        .bind(&input.linkedin_url)
        .bind(&input.twitter_url)
        .bind(&input.facebook_url)
        .bind(&input.instagram_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    async fn update_team_member(
        &self,
        id: i64,
        input: &TeamMemberInput,
    ) -> RepoResult<Option<TeamMember>> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members SET
                name = $2, title = $3, description = $4, image = $5, member_type = $6,
                order_index = COALESCE($7, order_index), linkedin_url = $8, twitter_url = $9,
                facebook_url = $10, instagram_url = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.member_type)
        .bind(input.order_index)
        .bind(&input.linkedin_url)
        .bind(&input.twitter_url)
        .bind(&input.facebook_url)
        .bind(&input.instagram_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn delete_team_member(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("team_members", id).await
    }

    async fn reorder_team_members(&self, entries: &[ReorderEntry]) -> RepoResult<()> {
        self.reorder("team_members", entries).await
    }

    // --- Board members ---

    async fn list_board_members(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<BoardMember>> {
        let query = ListQuery {
            table: "board_members",
            search_columns: &["name", "position"],
            search: filter.search.clone(),
            exact: Vec::new(),
            predicate: None,
            order_by: "order_index ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_board_member(&self, id: i64) -> RepoResult<Option<BoardMember>> {
        self.fetch_row("board_members", id).await
    }

    async fn create_board_member(&self, input: &BoardMemberInput) -> RepoResult<BoardMember> {
        let member = sqlx::query_as::<_, BoardMember>(
            r#"
            INSERT INTO board_members (
                name, position, image, description, linkedin, facebook, instagram, order_index
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                COALESCE($8, (SELECT COALESCE(MAX(order_index), 0) + 1 FROM board_members))
            )
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.position)
        .bind(&input.image)
        .bind(&input.description)
        .bind(&input.linkedin)
        .bind(&input.facebook)
        .bind(&input.instagram)
        .bind(input.order_index)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    async fn update_board_member(
        &self,
        id: i64,
        input: &BoardMemberInput,
    ) -> RepoResult<Option<BoardMember>> {
        let member = sqlx::query_as::<_, BoardMember>(
            r#"
            UPDATE board_members SET
                name = $2, position = $3, image = $4, description = $5, linkedin = $6,
                facebook = $7, instagram = $8, order_index = COALESCE($9, order_index),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.position)
        .bind(&input.image)
        .bind(&input.description)
        .bind(&input.linkedin)
        .bind(&input.facebook)
        .bind(&input.instagram)
        .bind(input.order_index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn delete_board_member(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("board_members", id).await
    }

    async fn reorder_board_members(&self, entries: &[ReorderEntry]) -> RepoResult<()> {
        self.reorder("board_members", entries).await
    }

    // --- Traders ---

    async fn list_traders(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Trader>> {
        let query = ListQuery {
            table: "traders",
            search_columns: &["name", "industry", "email"],
            search: filter.search.clone(),
            exact: vec![
                ("status", filter.status.clone()),
                ("member_type", filter.trader_type.clone()),
            ],
            predicate: None,
            order_by: "name ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_trader(&self, id: i64) -> RepoResult<Option<Trader>> {
        self.fetch_row("traders", id).await
    }

    async fn create_trader(&self, input: &TraderInput) -> RepoResult<Trader> {
        let trader = sqlx::query_as::<_, Trader>(
            r#"
            INSERT INTO traders (
                name, industry, member_type, phone_no, email, address, registration_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.industry)
        .bind(&input.member_type)
        .bind(&input.phone_no)
        .bind(&input.email)
        .bind(&input.address)
        .bind(input.registration_date)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(trader)
    }

    async fn update_trader(&self, id: i64, input: &TraderInput) -> RepoResult<Option<Trader>> {
        let trader = sqlx::query_as::<_, Trader>(
            r#"
            UPDATE traders SET
                name = $2, industry = $3, member_type = $4, phone_no = $5, email = $6,
                address = $7, registration_date = COALESCE($8, registration_date),
                status = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.industry)
        .bind(&input.member_type)
        .bind(&input.phone_no)
        .bind(&input.email)
        .bind(&input.address)
        .bind(input.registration_date)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(trader)
    }

    async fn delete_trader(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("traders", id).await
    }

    // --- Brokers ---

    async fn list_brokers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Broker>> {
        let query = ListQuery {
            table: "brokers",
            search_columns: &["name", "company", "specialization"],
            search: filter.search.clone(),
            exact: vec![
                ("status", filter.status.clone()),
                ("specialization", filter.specialization.clone()),
            ],
            predicate: None,
            order_by: "name ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_broker(&self, id: i64) -> RepoResult<Option<Broker>> {
        self.fetch_row("brokers", id).await
    }

    async fn create_broker(&self, input: &BrokerInput) -> RepoResult<Broker> {
        let broker = sqlx::query_as::<_, Broker>(
            r#"
            INSERT INTO brokers (
                name, company, license_number, phone_no, email, address, specialization,
                experience_years, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.company)
        .bind(&input.license_number)
        .bind(&input.phone_no)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.specialization)
        .bind(input.experience_years)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(broker)
    }

    async fn update_broker(&self, id: i64, input: &BrokerInput) -> RepoResult<Option<Broker>> {
        let broker = sqlx::query_as::<_, Broker>(
            r#"
            UPDATE brokers SET
                name = $2, company = $3, license_number = $4, phone_no = $5, email = $6,
                address = $7, specialization = $8, experience_years = $9, status = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.company)
        .bind(&input.license_number)
        .bind(&input.phone_no)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.specialization)
        .bind(input.experience_years)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(broker)
    }

    async fn delete_broker(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("brokers", id).await
    }

    // --- Partners ---

    async fn list_partners(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Partner>> {
        let query = ListQuery {
            table: "partners",
            search_columns: &["name", "description"],
            search: filter.search.clone(),
            exact: vec![
                ("category", filter.category.clone()),
                ("status", filter.status.clone()),
            ],
            predicate: None,
            order_by: "name ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_partner(&self, id: i64) -> RepoResult<Option<Partner>> {
        self.fetch_row("partners", id).await
    }

    async fn create_partner(&self, input: &PartnerInput) -> RepoResult<Partner> {
        let partner = sqlx::query_as::<_, Partner>(
            r#"
            INSERT INTO partners (
                name, description, category, logo, website, email, phone, address, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.logo)
        .bind(&input.website)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(partner)
    }

    async fn update_partner(
        &self,
        id: i64,
        input: &PartnerInput,
    ) -> RepoResult<Option<Partner>> {
        let partner = sqlx::query_as::<_, Partner>(
            r#"
            UPDATE partners SET
                name = $2, description = $3, category = $4, logo = $5, website = $6,
                email = $7, phone = $8, address = $9, status = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.logo)
        .bind(&input.website)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(partner)
    }

    async fn delete_partner(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("partners", id).await
    }

    // --- Publications ---

    async fn list_publications(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<Publication>> {
        let query = ListQuery {
            table: "publications",
            search_columns: &["title", "description", "author"],
            search: filter.search.clone(),
            exact: vec![
                ("category", filter.category.clone()),
                ("status", filter.status.clone()),
            ],
            predicate: None,
            order_by: "publication_date DESC NULLS LAST, id DESC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_publication(&self, id: i64) -> RepoResult<Option<Publication>> {
        self.fetch_row("publications", id).await
    }

    async fn create_publication(&self, input: &PublicationInput) -> RepoResult<Publication> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            INSERT INTO publications (
                title, description, category, file_path, file_name, file_size, file_type,
                publication_date, author, tags, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.file_path)
        .bind(&input.file_name)
        .bind(input.file_size)
        .bind(&input.file_type)
        .bind(input.publication_date)
        .bind(&input.author)
        .bind(&input.tags)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(publication)
    }

    async fn update_publication(
        &self,
        id: i64,
        input: &PublicationInput,
    ) -> RepoResult<Option<Publication>> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            UPDATE publications SET
                title = $2, description = $3, category = $4, file_path = $5, file_name = $6,
                file_size = $7, file_type = $8,
                publication_date = COALESCE($9, publication_date), author = $10, tags = $11,
                status = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.file_path)
        .bind(&input.file_name)
        .bind(input.file_size)
        .bind(&input.file_type)
        .bind(input.publication_date)
        .bind(&input.author)
        .bind(&input.tags)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(publication)
    }

    async fn delete_publication(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("publications", id).await
    }

    // --- Careers ---

    async fn list_careers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Career>> {
        let query = ListQuery {
            table: "careers",
            search_columns: &["title", "description", "department", "location"],
            search: filter.search.clone(),
            exact: vec![
                ("category", filter.category.clone()),
                ("status", filter.status.clone()),
            ],
            predicate: None,
            order_by: "created_at DESC, id DESC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_career(&self, id: i64) -> RepoResult<Option<Career>> {
        self.fetch_row("careers", id).await
    }

    async fn create_career(&self, input: &CareerInput) -> RepoResult<Career> {
        let career = sqlx::query_as::<_, Career>(
            r#"
            INSERT INTO careers (
                title, description, category, department, location, employment_type,
                experience_level, requirements, responsibilities, benefits, salary_range,
                application_deadline, start_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.department)
        .bind(&input.location)
        .bind(&input.employment_type)
        .bind(&input.experience_level)
        .bind(&input.requirements)
        .bind(&input.responsibilities)
        .bind(&input.benefits)
        .bind(&input.salary_range)
        .bind(input.application_deadline)
        .bind(input.start_date)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(career)
    }

    async fn update_career(&self, id: i64, input: &CareerInput) -> RepoResult<Option<Career>> {
        let career = sqlx::query_as::<_, Career>(
            r#"
            UPDATE careers SET
                title = $2, description = $3, category = $4, department = $5, location = $6,
                employment_type = $7, experience_level = $8, requirements = $9,
                responsibilities = $10, benefits = $11, salary_range = $12,
                application_deadline = $13, start_date = $14, status = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.department)
        .bind(&input.location)
        .bind(&input.employment_type)
        .bind(&input.experience_level)
        .bind(&input.requirements)
        .bind(&input.responsibilities)
        .bind(&input.benefits)
        .bind(&input.salary_range)
        .bind(input.application_deadline)
        .bind(input.start_date)
        .bind(&input.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(career)
    }

    async fn delete_career(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("careers", id).await
    }

    // --- Commodities ---

    async fn list_commodities(
        &self,
        filter: &DirectoryFilter,
        active_only: bool,
    ) -> RepoResult<Paginated<Commodity>> {
        let query = ListQuery {
            table: "commodities",
            search_columns: &["name", "code", "description"],
            search: filter.search.clone(),
            exact: vec![
                ("category", filter.category.clone()),
                ("market_status", filter.status.clone()),
            ],
            predicate: active_only.then_some("is_active"),
            order_by: "name ASC, id ASC",
        };
        self.fetch_page(&query, filter.page).await
    }

    async fn get_commodity(&self, id: i64) -> RepoResult<Option<Commodity>> {
        self.fetch_row("commodities", id).await
    }

    async fn create_commodity(&self, input: &CommodityInput) -> RepoResult<Commodity> {
        let commodity = sqlx::query_as::<_, Commodity>(
            r#"
            INSERT INTO commodities (
                name, code, description, category, unit, current_price, previous_price,
                price_change, change_percent, market_status, is_active
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $6 - $7,
                CASE WHEN $7 = 0 THEN 0 ELSE ($6 - $7) / $7 * 100 END,
                $8, $9
            )
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(input.code.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(input.current_price)
        .bind(input.previous_price)
        .bind(&input.market_status)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(commodity)
    }

    async fn update_commodity(
        &self,
        id: i64,
        input: &CommodityInput,
    ) -> RepoResult<Option<Commodity>> {
        let commodity = sqlx::query_as::<_, Commodity>(
            r#"
            UPDATE commodities SET
                name = $2, code = $3, description = $4, category = $5, unit = $6,
                current_price = $7, previous_price = $8, price_change = $7 - $8,
                change_percent = CASE WHEN $8 = 0 THEN 0 ELSE ($7 - $8) / $8 * 100 END,
                market_status = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.code.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(input.current_price)
        .bind(input.previous_price)
        .bind(&input.market_status)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(commodity)
    }

    async fn delete_commodity(&self, id: i64) -> RepoResult<bool> {
        self.delete_row("commodities", id).await
    }
}
