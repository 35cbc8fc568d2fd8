/// Roles offered when adding or editing a team member.
pub const DEFAULT_ROLES: &[&str] = &[
    "Project Manager",
    "Senior Developer",
    "Technical Lead",
    "Risk Analyst",
    "Compliance Officer",
    "API Developer",
    "UI/UX Designer",
    "Database Administrator",
    "QA Engineer",
    "Market Analyst",
    "DevOps Engineer",
    "UX Researcher",
    "Performance Engineer",
    "Localization Specialist",
    "Mobile Developer",
    "Legal Counsel",
    "CI/CD Engineer",
    "Security Engineer",
    "Monitoring Specialist",
    "Product Owner",
];
