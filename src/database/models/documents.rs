use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::UnknownVariant;

/// A named upload slot on a documents record, backed by one text column
pub trait DocumentField: FromStr<Err = UnknownVariant> + Copy + Send + Sync + fmt::Debug + 'static {
    /// Column holding the stored path; also the multipart field name
    fn column(self) -> &'static str;
}

/// Supporting documents for an agent application (1:1, created lazily)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AgentDocuments {
    pub id: i32,
    pub application_id: i32,
    pub passport: Option<String>,
    pub masters_certificate: Option<String>,
    pub masters_transcript: Option<String>,
    pub honers_certificate: Option<String>,
    pub honers_transcript: Option<String>,
    pub hsc_certificate: Option<String>,
    pub hsc_transcript: Option<String>,
    pub ssc_certificate: Option<String>,
    pub ssc_transcript: Option<String>,
    pub ielts_certificate: Option<String>,
    pub cv: Option<String>,
    pub resume: Option<String>,
    pub lor: Option<String>,
    pub job_letter: Option<String>,
    pub others: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentDocumentField {
    Passport,
    MastersCertificate,
    MastersTranscript,
    HonersCertificate,
    HonersTranscript,
    HscCertificate,
    HscTranscript,
    SscCertificate,
    SscTranscript,
    IeltsCertificate,
    Cv,
    Resume,
    Lor,
    JobLetter,
    Others,
}

impl AgentDocumentField {
    pub const ALL: [AgentDocumentField; 15] = [
        Self::Passport,
        Self::MastersCertificate,
        Self::MastersTranscript,
        Self::HonersCertificate,
        Self::HonersTranscript,
        Self::HscCertificate,
        Self::HscTranscript,
        Self::SscCertificate,
        Self::SscTranscript,
        Self::IeltsCertificate,
        Self::Cv,
        Self::Resume,
        Self::Lor,
        Self::JobLetter,
        Self::Others,
    ];
}

impl DocumentField for AgentDocumentField {
    fn column(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::MastersCertificate => "masters_certificate",
            Self::MastersTranscript => "masters_transcript",
            Self::HonersCertificate => "honers_certificate",
            Self::HonersTranscript => "honers_transcript",
            Self::HscCertificate => "hsc_certificate",
            Self::HscTranscript => "hsc_transcript",
            Self::SscCertificate => "ssc_certificate",
            Self::SscTranscript => "ssc_transcript",
            Self::IeltsCertificate => "ielts_certificate",
            Self::Cv => "cv",
            Self::Resume => "resume",
            Self::Lor => "lor",
            Self::JobLetter => "job_letter",
            Self::Others => "others",
        }
    }
}

impl FromStr for AgentDocumentField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.column() == name)
            .ok_or_else(|| UnknownVariant::new("document field", s))
    }
}

impl AgentDocuments {
    pub fn empty(application_id: i32) -> Self {
        Self {
            application_id,
            ..Default::default()
        }
    }

    pub fn slot_mut(&mut self, field: AgentDocumentField) -> &mut Option<String> {
        match field {
            AgentDocumentField::Passport => &mut self.passport,
            AgentDocumentField::MastersCertificate => &mut self.masters_certificate,
            AgentDocumentField::MastersTranscript => &mut self.masters_transcript,
            AgentDocumentField::HonersCertificate => &mut self.honers_certificate,
            AgentDocumentField::HonersTranscript => &mut self.honers_transcript,
            AgentDocumentField::HscCertificate => &mut self.hsc_certificate,
            AgentDocumentField::HscTranscript => &mut self.hsc_transcript,
            AgentDocumentField::SscCertificate => &mut self.ssc_certificate,
            AgentDocumentField::SscTranscript => &mut self.ssc_transcript,
            AgentDocumentField::IeltsCertificate => &mut self.ielts_certificate,
            AgentDocumentField::Cv => &mut self.cv,
            AgentDocumentField::Resume => &mut self.resume,
            AgentDocumentField::Lor => &mut self.lor,
            AgentDocumentField::JobLetter => &mut self.job_letter,
            AgentDocumentField::Others => &mut self.others,
        }
    }
}

/// Supporting documents for a student application (1:1, created lazily)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StudentDocuments {
    pub id: i32,
    pub application_id: i32,
    pub passport: Option<String>,
    pub last_graduation_certificate: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentDocumentField {
    Passport,
    LastGraduationCertificate,
}

impl DocumentField for StudentDocumentField {
    fn column(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::LastGraduationCertificate => "last_graduation_certificate",
        }
    }
}

impl FromStr for StudentDocumentField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "passport" => Ok(Self::Passport),
            "last_graduation_certificate" => Ok(Self::LastGraduationCertificate),
            _ => Err(UnknownVariant::new("document field", s)),
        }
    }
}

impl StudentDocuments {
    pub fn empty(application_id: i32) -> Self {
        Self {
            application_id,
            ..Default::default()
        }
    }

    pub fn slot_mut(&mut self, field: StudentDocumentField) -> &mut Option<String> {
        match field {
            StudentDocumentField::Passport => &mut self.passport,
            StudentDocumentField::LastGraduationCertificate => {
                &mut self.last_graduation_certificate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_fields_parse_from_their_column_names() {
        for field in AgentDocumentField::ALL {
            assert_eq!(field.column().parse::<AgentDocumentField>().unwrap(), field);
        }
        assert_eq!(" lor ".parse::<AgentDocumentField>().unwrap(), AgentDocumentField::Lor);
        assert!("visa".parse::<AgentDocumentField>().is_err());
    }

    #[test]
    fn student_fields_reject_agent_only_slots() {
        assert!("passport".parse::<StudentDocumentField>().is_ok());
        assert!("cv".parse::<StudentDocumentField>().is_err());
    }

    #[test]
    fn slot_mut_targets_the_named_column() {
        let mut documents = AgentDocuments::empty(3);
        *documents.slot_mut(AgentDocumentField::JobLetter) = Some("media/documents/x.pdf".into());
        assert_eq!(documents.job_letter.as_deref(), Some("media/documents/x.pdf"));
        assert!(documents.passport.is_none());
    }
}
