//! Fixed technology-term dictionary for extraction.
//!
//! Entries are `(canonical name, category)`. Matching is case-insensitive
//! whole-word; the canonical casing is what callers see back. Order is
//! meaningful — extraction reports hits in dictionary order.

use crate::models::profile::TechCategory;

pub(crate) const DICTIONARY: &[(&str, TechCategory)] = &[
    // Programming languages
    ("JavaScript", TechCategory::ProgrammingLanguages),
    ("TypeScript", TechCategory::ProgrammingLanguages),
    ("Python", TechCategory::ProgrammingLanguages),
    ("Java", TechCategory::ProgrammingLanguages),
    ("C++", TechCategory::ProgrammingLanguages),
    ("C#", TechCategory::ProgrammingLanguages),
    ("Go", TechCategory::ProgrammingLanguages),
    ("Golang", TechCategory::ProgrammingLanguages),
    ("Rust", TechCategory::ProgrammingLanguages),
    ("Ruby", TechCategory::ProgrammingLanguages),
    ("PHP", TechCategory::ProgrammingLanguages),
    ("Swift", TechCategory::ProgrammingLanguages),
    ("Kotlin", TechCategory::ProgrammingLanguages),
    ("Scala", TechCategory::ProgrammingLanguages),
    ("Dart", TechCategory::ProgrammingLanguages),
    ("Perl", TechCategory::ProgrammingLanguages),
    ("Haskell", TechCategory::ProgrammingLanguages),
    ("Elixir", TechCategory::ProgrammingLanguages),
    // Frontend
    ("React", TechCategory::Frontend),
    ("Angular", TechCategory::Frontend),
    ("Vue", TechCategory::Frontend),
    ("Vue.js", TechCategory::Frontend),
    ("Next.js", TechCategory::Frontend),
    ("Nuxt", TechCategory::Frontend),
    ("Svelte", TechCategory::Frontend),
    ("Redux", TechCategory::Frontend),
    ("HTML", TechCategory::Frontend),
    ("CSS", TechCategory::Frontend),
    ("Sass", TechCategory::Frontend),
    ("Tailwind", TechCategory::Frontend),
    ("Bootstrap", TechCategory::Frontend),
    ("jQuery", TechCategory::Frontend),
    ("Webpack", TechCategory::Frontend),
    ("Vite", TechCategory::Frontend),
    // Backend
    ("Node.js", TechCategory::Backend),
    ("Express", TechCategory::Backend),
    ("NestJS", TechCategory::Backend),
    ("Django", TechCategory::Backend),
    ("Flask", TechCategory::Backend),
    ("FastAPI", TechCategory::Backend),
    ("Spring", TechCategory::Backend),
    ("Spring Boot", TechCategory::Backend),
    ("Rails", TechCategory::Backend),
    ("Laravel", TechCategory::Backend),
    ("ASP.NET", TechCategory::Backend),
    ("GraphQL", TechCategory::Backend),
    ("gRPC", TechCategory::Backend),
    ("REST API", TechCategory::Backend),
    ("Microservices", TechCategory::Backend),
    // Databases
    ("MySQL", TechCategory::Databases),
    ("PostgreSQL", TechCategory::Databases),
    ("MongoDB", TechCategory::Databases),
    ("Redis", TechCategory::Databases),
    ("SQLite", TechCategory::Databases),
    ("MariaDB", TechCategory::Databases),
    ("Oracle", TechCategory::Databases),
    ("Cassandra", TechCategory::Databases),
    ("DynamoDB", TechCategory::Databases),
    ("Elasticsearch", TechCategory::Databases),
    ("Firebase", TechCategory::Databases),
    ("Supabase", TechCategory::Databases),
    ("SQL", TechCategory::Databases),
    ("NoSQL", TechCategory::Databases),
    // Cloud & DevOps
    ("AWS", TechCategory::CloudDevOps),
    ("Azure", TechCategory::CloudDevOps),
    ("GCP", TechCategory::CloudDevOps),
    ("Google Cloud", TechCategory::CloudDevOps),
    ("Docker", TechCategory::CloudDevOps),
    ("Kubernetes", TechCategory::CloudDevOps),
    ("Terraform", TechCategory::CloudDevOps),
    ("Ansible", TechCategory::CloudDevOps),
    ("Jenkins", TechCategory::CloudDevOps),
    ("CI/CD", TechCategory::CloudDevOps),
    ("Nginx", TechCategory::CloudDevOps),
    ("Linux", TechCategory::CloudDevOps),
    ("Serverless", TechCategory::CloudDevOps),
    ("Lambda", TechCategory::CloudDevOps),
    ("Heroku", TechCategory::CloudDevOps),
    ("Vercel", TechCategory::CloudDevOps),
    // Mobile
    ("React Native", TechCategory::Mobile),
    ("Flutter", TechCategory::Mobile),
    ("Android", TechCategory::Mobile),
    ("iOS", TechCategory::Mobile),
    ("SwiftUI", TechCategory::Mobile),
    ("Xamarin", TechCategory::Mobile),
    ("Ionic", TechCategory::Mobile),
    // Data Science & ML
    ("Machine Learning", TechCategory::DataScienceML),
    ("Deep Learning", TechCategory::DataScienceML),
    ("TensorFlow", TechCategory::DataScienceML),
    ("PyTorch", TechCategory::DataScienceML),
    ("Keras", TechCategory::DataScienceML),
    ("Scikit-learn", TechCategory::DataScienceML),
    ("Pandas", TechCategory::DataScienceML),
    ("NumPy", TechCategory::DataScienceML),
    ("NLP", TechCategory::DataScienceML),
    ("OpenCV", TechCategory::DataScienceML),
    ("Data Analysis", TechCategory::DataScienceML),
    ("Jupyter", TechCategory::DataScienceML),
    ("Spark", TechCategory::DataScienceML),
    ("Hadoop", TechCategory::DataScienceML),
    // Testing
    ("Jest", TechCategory::Testing),
    ("Mocha", TechCategory::Testing),
    ("Cypress", TechCategory::Testing),
    ("Selenium", TechCategory::Testing),
    ("Playwright", TechCategory::Testing),
    ("JUnit", TechCategory::Testing),
    ("Pytest", TechCategory::Testing),
    ("Unit Testing", TechCategory::Testing),
    ("TDD", TechCategory::Testing),
    // Developer tools
    ("Git", TechCategory::DevTools),
    ("GitHub", TechCategory::DevTools),
    ("GitLab", TechCategory::DevTools),
    ("Bitbucket", TechCategory::DevTools),
    ("Jira", TechCategory::DevTools),
    ("Postman", TechCategory::DevTools),
    ("VS Code", TechCategory::DevTools),
    ("IntelliJ", TechCategory::DevTools),
    ("Figma", TechCategory::DevTools),
    ("Babel", TechCategory::DevTools),
    ("npm", TechCategory::DevTools),
    ("Yarn", TechCategory::DevTools),
    ("Agile", TechCategory::DevTools),
    ("Scrum", TechCategory::DevTools),
];
