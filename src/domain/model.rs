use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{require_text, require_value};

/// 暫存上傳檔案對外提供的 URL 前綴
pub const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// 物件資訊
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyRecord {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub description: String,
    pub features: Vec<String>,
}

/// 聯絡人資料：房仲與貸款專員共用同一結構
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactProfile {
    pub name: String,
    pub company: String,
    #[serde(alias = "nmls", alias = "licenseNumber")]
    pub license: String,
    pub phone: String,
    pub email: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoAsset {
    #[serde(alias = "path")]
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NeighborhoodInfo {
    pub enabled: bool,
    pub description: String,
    pub highlights: Vec<String>,
}

/// 表單送出的完整內容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSubmission {
    pub property: PropertyRecord,
    pub realtor: ContactProfile,
    pub loan_officer: ContactProfile,
    pub photos: Vec<PhotoAsset>,
    pub testimonials: Vec<Testimonial>,
    pub neighborhood: Option<NeighborhoodInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedSite {
    pub slug: String,
    pub url: String,
}

/// 待提交的單一檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: Vec<u8>,
}

impl FileChange {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl SiteSubmission {
    /// 列出缺少的必填欄位
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        let property = &self.property;

        require_text(&mut missing, "property.address", &property.address);
        require_text(&mut missing, "property.city", &property.city);
        require_text(&mut missing, "property.state", &property.state);
        require_text(&mut missing, "property.zip", &property.zip);
        require_value(&mut missing, "property.price", &property.price);

        for (prefix, contact) in [("realtor", &self.realtor), ("loanOfficer", &self.loan_officer)] {
            require_text(&mut missing, &format!("{}.name", prefix), &contact.name);
            require_text(&mut missing, &format!("{}.phone", prefix), &contact.phone);
            require_text(&mut missing, &format!("{}.email", prefix), &contact.email);
        }

        missing
    }

    pub fn invalid_fields(&self) -> Vec<String> {
        let mut invalid = Vec::new();
        let property = &self.property;

        if property.price.is_some_and(|price| !price.is_finite() || price < 0.0) {
            invalid.push("property.price".to_string());
        }
        // 衛浴數只接受 0.5 的倍數
        if property
            .bathrooms
            .is_some_and(|baths| baths < 0.0 || (baths * 2.0).fract() != 0.0)
        {
            invalid.push("property.bathrooms".to_string());
        }

        invalid
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SiteError::validation("Missing required fields", missing));
        }

        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return Err(SiteError::validation(
                format!("Invalid field values: {}", invalid.join(", ")),
                Vec::new(),
            ));
        }

        Ok(())
    }

    /// 預覽用：以佔位資料補齊空白欄位
    pub fn with_preview_defaults(mut self) -> Self {
        fn fill(value: &mut String, placeholder: &str) {
            if value.trim().is_empty() {
                *value = placeholder.to_string();
            }
        }

        let property = &mut self.property;
        fill(&mut property.address, "123 Main Street");
        fill(&mut property.city, "Springfield");
        fill(&mut property.state, "IL");
        fill(&mut property.zip, "62701");
        property.price.get_or_insert(450_000.0);
        property.bedrooms.get_or_insert(3);
        property.bathrooms.get_or_insert(2.0);
        fill(
            &mut property.description,
            "A beautiful home in a quiet neighborhood, close to parks and schools.",
        );

        let realtor = &mut self.realtor;
        fill(&mut realtor.name, "Jane Realtor");
        fill(&mut realtor.company, "Example Realty");
        fill(&mut realtor.license, "RE-000000");
        fill(&mut realtor.phone, "(555) 010-0100");
        fill(&mut realtor.email, "agent@example.com");

        let loan_officer = &mut self.loan_officer;
        fill(&mut loan_officer.name, "John Lender");
        fill(&mut loan_officer.company, "Example Mortgage");
        fill(&mut loan_officer.license, "000000");
        fill(&mut loan_officer.phone, "(555) 010-0200");
        fill(&mut loan_officer.email, "lender@example.com");

        self
    }

    /// 本地暫存上傳檔案的參照（照片與聯絡人頭像），依出現順序且不重複
    pub fn staged_upload_refs(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        let candidates = self
            .photos
            .iter()
            .map(|photo| photo.url.as_str())
            .chain(self.realtor.photo.as_deref())
            .chain(self.loan_officer.photo.as_deref());

        for reference in candidates {
            if reference.starts_with(UPLOAD_URL_PREFIX)
                && !refs.contains(&reference)
            {
                refs.push(reference);
            }
        }
        refs
    }
}
