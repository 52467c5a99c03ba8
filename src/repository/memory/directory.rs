use std::cmp::{Ordering, Reverse};

use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryRepository, Table, matches_exact, matches_search};
use crate::{
    models::{
        Paginated,
        directory::{
            BoardMember, BoardMemberInput, Broker, BrokerInput, Career, CareerInput, Commodity,
            CommodityInput, DirectoryFilter, Partner, PartnerInput, Publication,
            PublicationInput, ReorderEntry, TeamMember, TeamMemberInput, Trader, TraderInput,
        },
    },
    repository::{DirectoryRepository, RepoError, RepoResult, constraints},
};

/// Filters, orders and slices one table.
fn list<T: Clone>(
    table: &Table<T>,
    filter: &DirectoryFilter,
    keep: impl Fn(&T) -> bool,
    order: impl FnMut(&T, &T) -> Ordering,
) -> Paginated<T> {
    let mut rows: Vec<T> = table.iter().filter(|row| keep(row)).cloned().collect();
    rows.sort_by(order);
    filter.page.slice(rows)
}

/// Positions are rewritten only once every id is known to exist.
fn reorder<T: Clone>(
    table: &mut Table<T>,
    entries: &[ReorderEntry],
    apply: impl Fn(&mut T, i32),
) -> RepoResult<()> {
    if entries.iter().any(|entry| !table.rows.contains_key(&entry.id)) {
        return Err(RepoError::NotFound);
    }
    for entry in entries {
        table.update(entry.id, |row| apply(row, entry.order_index));
    }
    Ok(())
}

fn code_taken(commodities: &Table<Commodity>, code: &str, exclude_id: Option<i64>) -> bool {
    commodities
        .iter()
        .any(|commodity| commodity.code == code && Some(commodity.id) != exclude_id)
}

#[async_trait]
impl DirectoryRepository for MemoryRepository {
    // --- Team members ---

    async fn list_team_members(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<TeamMember>> {
        let state = self.read()?;
        Ok(list(
            &state.team_members,
            filter,
            |member| {
                matches_exact(filter.member_type.as_deref(), &member.member_type)
                    && matches_search(
                        filter.search.as_deref(),
                        &[&member.name, &member.title, &member.description],
                    )
            },
            |a, b| (a.order_index, a.id).cmp(&(b.order_index, b.id)),
        ))
    }

    async fn get_team_member(&self, id: i64) -> RepoResult<Option<TeamMember>> {
        Ok(self.read()?.team_members.get(id))
    }

    async fn create_team_member(&self, input: &TeamMemberInput) -> RepoResult<TeamMember> {
        let mut state = self.write()?;
        let order_index = input.order_index.unwrap_or_else(|| {
            state
                .team_members
                .iter()
                .filter(|member| member.member_type == input.member_type)
                .map(|member| member.order_index)
                .max()
                .unwrap_or(0)
                + 1
        });
        let now = Utc::now();
        Ok(state.team_members.insert_with(|id| TeamMember {
            id,
            name: input.name.trim().to_string(),
            title: input.title.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            member_type: input.member_type.clone(),
            order_index,
            linkedin_url: input.linkedin_url.clone(),
            twitter_url: input.twitter_url.clone(),
            facebook_url: input.facebook_url.clone(),
            instagram_url: input.instagram_url.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_team_member(
        &self,
        id: i64,
        input: &TeamMemberInput,
    ) -> RepoResult<Option<TeamMember>> {
        Ok(self.write()?.team_members.update(id, |member| {
            member.name = input.name.trim().to_string();
            member.title.clone_from(&input.title);
            member.description.clone_from(&input.description);
            member.image.clone_from(&input.image);
            member.member_type.clone_from(&input.member_type);
            if let Some(order_index) = input.order_index {
                member.order_index = order_index;
            }
            member.linkedin_url.clone_from(&input.linkedin_url);
            member.twitter_url.clone_from(&input.twitter_url);
            member.facebook_url.clone_from(&input.facebook_url);
            member.instagram_url.clone_from(&input.instagram_url);
            member.updated_at = Utc::now();
        }))
    }

    async fn delete_team_member(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.team_members.remove(id))
    }

    async fn reorder_team_members(&self, entries: &[ReorderEntry]) -> RepoResult<()> {
        let now = Utc::now();
        reorder(&mut self.write()?.team_members, entries, |member, index| {
            member.order_index = index;
            member.updated_at = now;
        })
    }

    // --- Board members ---

    async fn list_board_members(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<BoardMember>> {
        let state = self.read()?;
        Ok(list(
            &state.board_members,
            filter,
            |member| matches_search(filter.search.as_deref(), &[&member.name, &member.position]),
            |a, b| (a.order_index, a.id).cmp(&(b.order_index, b.id)),
        ))
    }

    async fn get_board_member(&self, id: i64) -> RepoResult<Option<BoardMember>> {
        Ok(self.read()?.board_members.get(id))
    }

    async fn create_board_member(&self, input: &BoardMemberInput) -> RepoResult<BoardMember> {
        let mut state = self.write()?;
        let order_index = input.order_index.unwrap_or_else(|| {
            state
                .board_members
                .iter()
                .map(|member| member.order_index)
                .max()
                .unwrap_or(0)
                + 1
        });
        let now = Utc::now();
        Ok(state.board_members.insert_with(|id| BoardMember {
            id,
            name: input.name.trim().to_string(),
            position: input.position.clone(),
            image: input.image.clone(),
            description: input.description.clone(),
            linkedin: input.linkedin.clone(),
            facebook: input.facebook.clone(),
            instagram: input.instagram.clone(),
            order_index,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_board_member(
        &self,
        id: i64,
        input: &BoardMemberInput,
    ) -> RepoResult<Option<BoardMember>> {
        Ok(self.write()?.board_members.update(id, |member| {
            member.name = input.name.trim().to_string();
            member.position.clone_from(&input.position);
            member.image.clone_from(&input.image);
            member.description.clone_from(&input.description);
            member.linkedin.clone_from(&input.linkedin);
            member.facebook.clone_from(&input.facebook);
            member.instagram.clone_from(&input.instagram);
            if let Some(order_index) = input.order_index {
                member.order_index = order_index;
            }
            member.updated_at = Utc::now();
        }))
    }

    async fn delete_board_member(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.board_members.remove(id))
    }

    async fn reorder_board_members(&self, entries: &[ReorderEntry]) -> RepoResult<()> {
        let now = Utc::now();
        reorder(&mut self.write()?.board_members, entries, |member, index| {
            member.order_index = index;
            member.updated_at = now;
        })
    }

    // --- Traders ---

    async fn list_traders(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Trader>> {
        let state = self.read()?;
        Ok(list(
            &state.traders,
            filter,
            |trader| {
                matches_exact(filter.status.as_deref(), &trader.status)
                    && matches_exact(filter.trader_type.as_deref(), &trader.member_type)
                    && matches_search(
                        filter.search.as_deref(),
                        &[&trader.name, &trader.industry, &trader.email],
                    )
            },
            |a, b| (&a.name, a.id).cmp(&(&b.name, b.id)),
        ))
    }

    async fn get_trader(&self, id: i64) -> RepoResult<Option<Trader>> {
        Ok(self.read()?.traders.get(id))
    }

    async fn create_trader(&self, input: &TraderInput) -> RepoResult<Trader> {
        let now = Utc::now();
        Ok(self.write()?.traders.insert_with(|id| Trader {
            id,
            name: input.name.trim().to_string(),
            industry: input.industry.clone(),
            member_type: input.member_type.clone(),
            phone_no: input.phone_no.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            registration_date: Some(input.registration_date.unwrap_or(now)),
            status: input.status.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_trader(&self, id: i64, input: &TraderInput) -> RepoResult<Option<Trader>> {
        Ok(self.write()?.traders.update(id, |trader| {
            trader.name = input.name.trim().to_string();
            trader.industry.clone_from(&input.industry);
            trader.member_type.clone_from(&input.member_type);
            trader.phone_no.clone_from(&input.phone_no);
            trader.email.clone_from(&input.email);
            trader.address.clone_from(&input.address);
            if input.registration_date.is_some() {
                trader.registration_date = input.registration_date;
            }
            trader.status.clone_from(&input.status);
            trader.updated_at = Utc::now();
        }))
    }

    async fn delete_trader(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.traders.remove(id))
    }

    // --- Brokers ---

    async fn list_brokers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Broker>> {
        let state = self.read()?;
        Ok(list(
            &state.brokers,
            filter,
            |broker| {
                matches_exact(filter.status.as_deref(), &broker.status)
                    && matches_exact(filter.specialization.as_deref(), &broker.specialization)
                    && matches_search(
                        filter.search.as_deref(),
                        &[&broker.name, &broker.company, &broker.specialization],
                    )
            },
            |a, b| (&a.name, a.id).cmp(&(&b.name, b.id)),
        ))
    }

    async fn get_broker(&self, id: i64) -> RepoResult<Option<Broker>> {
        Ok(self.read()?.brokers.get(id))
    }

    async fn create_broker(&self, input: &BrokerInput) -> RepoResult<Broker> {
        let now = Utc::now();
        Ok(self.write()?.brokers.insert_with(|id| Broker {
            id,
            name: input.name.trim().to_string(),
            company: input.company.clone(),
            license_number: input.license_number.clone(),
            phone_no: input.phone_no.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            specialization: input.specialization.clone(),
            experience_years: input.experience_years,
            status: input.status.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_broker(&self, id: i64, input: &BrokerInput) -> RepoResult<Option<Broker>> {
        Ok(self.write()?.brokers.update(id, |broker| {
            broker.name = input.name.trim().to_string();
            broker.company.clone_from(&input.company);
            broker.license_number.clone_from(&input.license_number);
            broker.phone_no.clone_from(&input.phone_no);
            broker.email.clone_from(&input.email);
            broker.address.clone_from(&input.address);
            broker.specialization.clone_from(&input.specialization);
            broker.experience_years = input.experience_years;
            broker.status.clone_from(&input.status);
            broker.updated_at = Utc::now();
        }))
    }

    async fn delete_broker(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.brokers.remove(id))
    }

    // --- Partners ---

    async fn list_partners(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Partner>> {
        let state = self.read()?;
        Ok(list(
            &state.partners,
            filter,
            |partner| {
                matches_exact(filter.category.as_deref(), &partner.category)
                    && matches_exact(filter.status.as_deref(), &partner.status)
                    && matches_search(
                        filter.search.as_deref(),
                        &[&partner.name, &partner.description],
                    )
            },
            |a, b| (&a.name, a.id).cmp(&(&b.name, b.id)),
        ))
    }

    async fn get_partner(&self, id: i64) -> RepoResult<Option<Partner>> {
        Ok(self.read()?.partners.get(id))
    }

    async fn create_partner(&self, input: &PartnerInput) -> RepoResult<Partner> {
        let now = Utc::now();
        Ok(self.write()?.partners.insert_with(|id| Partner {
            id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            category: input.category.clone(),
            logo: input.logo.clone(),
            website: input.website.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            status: input.status.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_partner(
        &self,
        id: i64,
        input: &PartnerInput,
    ) -> RepoResult<Option<Partner>> {
        Ok(self.write()?.partners.update(id, |partner| {
            partner.name = input.name.trim().to_string();
            partner.description.clone_from(&input.description);
            partner.category.clone_from(&input.category);
            partner.logo.clone_from(&input.logo);
            partner.website.clone_from(&input.website);
            partner.email.clone_from(&input.email);
            partner.phone.clone_from(&input.phone);
            partner.address.clone_from(&input.address);
            partner.status.clone_from(&input.status);
            partner.updated_at = Utc::now();
        }))
    }

    async fn delete_partner(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.partners.remove(id))
    }

    // --- Publications ---

    async fn list_publications(
        &self,
        filter: &DirectoryFilter,
    ) -> RepoResult<Paginated<Publication>> {
        let state = self.read()?;
        Ok(list(
            &state.publications,
            filter,
            |publication| {
                matches_exact(filter.category.as_deref(), &publication.category)
                    && matches_exact(filter.status.as_deref(), &publication.status)
                    && matches_search(
                        filter.search.as_deref(),
                        &[
                            &publication.title,
                            &publication.description,
                            &publication.author,
                        ],
                    )
            },
            // Newest first; undated publications last.
            |a, b| {
                (a.publication_date.is_none(), Reverse((a.publication_date, a.id)))
                    .cmp(&(b.publication_date.is_none(), Reverse((b.publication_date, b.id))))
            },
        ))
    }

    async fn get_publication(&self, id: i64) -> RepoResult<Option<Publication>> {
        Ok(self.read()?.publications.get(id))
    }

    async fn create_publication(&self, input: &PublicationInput) -> RepoResult<Publication> {
        let now = Utc::now();
        Ok(self.write()?.publications.insert_with(|id| Publication {
            id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            category: input.category.clone(),
            file_path: input.file_path.clone(),
            file_name: input.file_name.clone(),
            file_size: input.file_size,
            file_type: input.file_type.clone(),
            publication_date: Some(input.publication_date.unwrap_or(now)),
            author: input.author.clone(),
            tags: input.tags.clone(),
            status: input.status.clone(),
            download_count: 0,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_publication(
        &self,
        id: i64,
        input: &PublicationInput,
    ) -> RepoResult<Option<Publication>> {
        Ok(self.write()?.publications.update(id, |publication| {
            publication.title = input.title.trim().to_string();
            publication.description.clone_from(&input.description);
            publication.category.clone_from(&input.category);
            publication.file_path.clone_from(&input.file_path);
            publication.file_name.clone_from(&input.file_name);
            publication.file_size = input.file_size;
            publication.file_type.clone_from(&input.file_type);
            if input.publication_date.is_some() {
                publication.publication_date = input.publication_date;
            }
            publication.author.clone_from(&input.author);
            publication.tags.clone_from(&input.tags);
            publication.status.clone_from(&input.status);
            publication.updated_at = Utc::now();
        }))
    }

    async fn delete_publication(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.publications.remove(id))
    }

    // --- Careers ---

    async fn list_careers(&self, filter: &DirectoryFilter) -> RepoResult<Paginated<Career>> {
        let state = self.read()?;
        Ok(list(
            &state.careers,
            filter,
            |career| {
                matches_exact(filter.category.as_deref(), &career.category)
                    && matches_exact(filter.status.as_deref(), &career.status)
                    && matches_search(
                        filter.search.as_deref(),
                        &[
                            &career.title,
                            &career.description,
                            &career.department,
                            &career.location,
                        ],
                    )
            },
            |a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)),
        ))
    }

    async fn get_career(&self, id: i64) -> RepoResult<Option<Career>> {
        Ok(self.read()?.careers.get(id))
    }

    async fn create_career(&self, input: &CareerInput) -> RepoResult<Career> {
        let now = Utc::now();
        Ok(self.write()?.careers.insert_with(|id| Career {
            id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            category: input.category.clone(),
            department: input.department.clone(),
            location: input.location.clone(),
            employment_type: input.employment_type.clone(),
            experience_level: input.experience_level.clone(),
            requirements: input.requirements.clone(),
            responsibilities: input.responsibilities.clone(),
            benefits: input.benefits.clone(),
            salary_range: input.salary_range.clone(),
            application_deadline: input.application_deadline,
            start_date: input.start_date,
            status: input.status.clone(),
            application_count: 0,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_career(&self, id: i64, input: &CareerInput) -> RepoResult<Option<Career>> {
        Ok(self.write()?.careers.update(id, |career| {
            career.title = input.title.trim().to_string();
            career.description.clone_from(&input.description);
            career.category.clone_from(&input.category);
            career.department.clone_from(&input.department);
            career.location.clone_from(&input.location);
            career.employment_type.clone_from(&input.employment_type);
            career.experience_level.clone_from(&input.experience_level);
            career.requirements.clone_from(&input.requirements);
            career.responsibilities.clone_from(&input.responsibilities);
            career.benefits.clone_from(&input.benefits);
            career.salary_range.clone_from(&input.salary_range);
            career.application_deadline = input.application_deadline;
            career.start_date = input.start_date;
            career.status.clone_from(&input.status);
            career.updated_at = Utc::now();
        }))
    }

    async fn delete_career(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.careers.remove(id))
    }

    // --- Commodities ---

    async fn list_commodities(
        &self,
        filter: &DirectoryFilter,
        active_only: bool,
    ) -> RepoResult<Paginated<Commodity>> {
        let state = self.read()?;
        Ok(list(
            &state.commodities,
            filter,
            |commodity| {
                (!active_only || commodity.is_active)
                    && matches_exact(filter.category.as_deref(), &commodity.category)
                    && matches_exact(filter.status.as_deref(), &commodity.market_status)
                    && matches_search(
                        filter.search.as_deref(),
                        &[&commodity.name, &commodity.code, &commodity.description],
                    )
            },
            |a, b| (&a.name, a.id).cmp(&(&b.name, b.id)),
        ))
    }

    async fn get_commodity(&self, id: i64) -> RepoResult<Option<Commodity>> {
        Ok(self.read()?.commodities.get(id))
    }

    async fn create_commodity(&self, input: &CommodityInput) -> RepoResult<Commodity> {
        let mut state = self.write()?;
        let code = input.code.trim();
        if code_taken(&state.commodities, code, None) {
            return Err(RepoError::conflict(constraints::COMMODITY_CODE));
        }
        let now = Utc::now();
        Ok(state.commodities.insert_with(|id| {
            let mut commodity = Commodity {
                id,
                name: input.name.trim().to_string(),
                code: code.to_string(),
                description: input.description.clone(),
                category: input.category.clone(),
                unit: input.unit.clone(),
                current_price: input.current_price,
                previous_price: input.previous_price,
                price_change: 0.0,
                change_percent: 0.0,
                market_status: input.market_status.clone(),
                is_active: input.is_active,
                created_at: now,
                updated_at: now,
            };
            commodity.refresh_change();
            commodity
        }))
    }

    async fn update_commodity(
        &self,
        id: i64,
        input: &CommodityInput,
    ) -> RepoResult<Option<Commodity>> {
        let mut state = self.write()?;
        let code = input.code.trim();
        if code_taken(&state.commodities, code, Some(id)) {
            return Err(RepoError::conflict(constraints::COMMODITY_CODE));
        }
        Ok(state.commodities.update(id, |commodity| {
            commodity.name = input.name.trim().to_string();
            commodity.code = code.to_string();
            commodity.description.clone_from(&input.description);
            commodity.category.clone_from(&input.category);
            commodity.unit.clone_from(&input.unit);
            commodity.current_price = input.current_price;
            commodity.previous_price = input.previous_price;
            commodity.refresh_change();
            commodity.market_status.clone_from(&input.market_status);
            commodity.is_active = input.is_active;
            commodity.updated_at = Utc::now();
        }))
    }

    async fn delete_commodity(&self, id: i64) -> RepoResult<bool> {
        Ok(self.write()?.commodities.remove(id))
    }
}
